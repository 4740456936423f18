use tracing::trace;

use crate::directory::Profile;

const LETTERS: usize = 26;

/// Something that can bring a section of the directory into view, e.g. a rendered list.
pub trait ScrollTarget {
    fn scroll_into_view(&mut self, anchor_id: &str);
}

/// Which letters of the alphabet have at least one profile, for jump navigation.
///
/// Built from the whole directory rather than the filtered view, so every section stays
/// reachable while filters are active. Names starting with anything other than an ASCII
/// letter are not indexed under any letter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlphabetIndex {
    present: [bool; LETTERS],
}

impl AlphabetIndex {
    pub fn build<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Profile>,
    {
        let mut index = Self::default();

        for profile in records {
            let first = profile.name.trim_start().chars().next();
            if let Some(slot) = first.and_then(slot).and_then(|i| index.present.get_mut(i)) {
                *slot = true;
            }
        }

        index
    }

    pub fn has_records(&self, letter: char) -> bool {
        slot(letter)
            .and_then(|i| self.present.get(i))
            .copied()
            .unwrap_or(false)
    }

    /// Every letter A–Z paired with whether it has records.
    pub fn letters(&self) -> impl Iterator<Item = (char, bool)> + '_ {
        ('A'..='Z').zip(self.present.iter().copied())
    }

    /// Id of the section heading for `letter`.
    pub fn anchor_id(letter: char) -> String {
        format!("letter-{}", letter.to_ascii_uppercase())
    }

    /// Scroll to the section for `letter`. Letters without records are ignored.
    ///
    /// Returns whether a scroll was requested.
    pub fn jump_to<T: ScrollTarget + ?Sized>(&self, letter: char, target: &mut T) -> bool {
        if !self.has_records(letter) {
            trace!("No profiles under {letter}, ignoring jump");
            return false;
        }

        target.scroll_into_view(&Self::anchor_id(letter));
        true
    }
}

fn slot(letter: char) -> Option<usize> {
    let upper = u8::try_from(letter.to_ascii_uppercase()).ok()?;
    upper.is_ascii_uppercase().then(|| usize::from(upper - b'A'))
}
