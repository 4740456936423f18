use std::path::PathBuf;

use clap::{Args, Subcommand};
use colored::Colorize;
use kenavo_lib::{
    ApiClient, Cfg, Error, Result,
    directory::{
        AlphabetIndex, Directory, Facet, Profile, ProfileQuery, ScrollTarget, fetch_profiles,
    },
    fs::read_json,
};
use strum::IntoEnumIterator;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List profiles matching a search and filters
    List {
        #[command(flatten)]
        source: Source,
        /// Free-text search
        #[arg(short, long, default_value = "")]
        query: String,
        /// Facet filter as `<year|location|industry>=<value>`, may be repeated
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(Facet, String)>,
        /// Print the matching profiles as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the values available for each filter
    Facets {
        #[command(flatten)]
        source: Source,
    },
    /// Show which letters have profiles
    Letters {
        #[command(flatten)]
        source: Source,
        /// Jump to the section for this letter
        #[arg(long)]
        jump: Option<char>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct Source {
    /// Read profiles from an exported JSON snapshot instead of the remote table
    #[arg(long)]
    file: Option<PathBuf>,
}

pub async fn handle(cfg: &Cfg, cmd: &Command) -> Result<()> {
    match cmd {
        Command::List {
            source,
            query,
            filters,
            json,
        } => {
            let mut directory = load(cfg, source).await?;
            directory.set_query(query);
            for (facet, value) in filters {
                directory.filters_mut().toggle(*facet, value);
            }

            let view = directory.view();
            if *json {
                println!("{}", to_json(&view)?);
            } else if view.is_empty() {
                println!("{}", "No alumni match your search".dimmed());
            } else {
                for profile in &view {
                    print_profile(profile);
                }
                println!(
                    "{}",
                    format!("{} of {}", view.len(), directory.records().len()).dimmed()
                );
            }
        }
        Command::Facets { source } => {
            let directory = load(cfg, source).await?;
            let options = directory.options();
            for facet in Facet::iter() {
                println!("{}", facet.to_string().bold());
                for option in options.get(facet) {
                    println!("  {} ({})", option.value, option.count);
                }
            }
        }
        Command::Letters { source, jump } => {
            let directory = load(cfg, source).await?;
            let alphabet = directory.alphabet();

            let line: Vec<String> = alphabet
                .letters()
                .map(|(letter, has)| {
                    if has {
                        letter.to_string().bold().to_string()
                    } else {
                        letter.to_string().dimmed().to_string()
                    }
                })
                .collect();
            println!("{}", line.join(" "));

            if let Some(letter) = jump {
                let mut target = Section::new(directory.records());
                if !alphabet.jump_to(*letter, &mut target) {
                    eprintln!("No alumni under {}", letter.to_ascii_uppercase());
                }
            }
        }
    }

    Ok(())
}

async fn load(cfg: &Cfg, source: &Source) -> Result<Directory> {
    let options = cfg.read().search.clone();

    let records: Vec<Profile> = match &source.file {
        Some(path) => read_json(path)?,
        None => {
            let client = ApiClient::from_config(cfg)?;
            let table = cfg.read().api.profiles_table.clone();
            fetch_profiles(&client, &table, &ProfileQuery::new()).await?
        }
    };

    Ok(Directory::new(records, options))
}

fn to_json(profiles: &[&Profile]) -> Result<String> {
    serde_json::to_string_pretty(profiles).map_err(Error::Encode)
}

fn parse_filter(raw: &str) -> std::result::Result<(Facet, String), String> {
    let (facet, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected <facet>=<value>, got `{raw}`"))?;
    let facet = Facet::parse(facet).map_err(|e| e.to_string())?;

    Ok((facet, value.trim().to_string()))
}

fn print_profile(profile: &Profile) {
    let mut details = Vec::new();
    if let Some(year) = &profile.year_graduated {
        details.push(year.clone());
    }
    if let Some(location) = &profile.location {
        details.push(location.clone());
    }
    if let Some(company) = profile.industry() {
        details.push(company.to_string());
    }

    println!("{} {}", profile.name.bold(), details.join(" · ").dimmed());
}

/// Prints the section a letter jump lands on.
struct Section<'a> {
    records: &'a [Profile],
}

impl<'a> Section<'a> {
    fn new(records: &'a [Profile]) -> Self {
        Self { records }
    }
}

impl ScrollTarget for Section<'_> {
    fn scroll_into_view(&mut self, anchor_id: &str) {
        let letter = anchor_id.chars().last().unwrap_or_default();
        println!("{}", format!("#{anchor_id}").green());
        for profile in self.records.iter().filter(|p| {
            p.name
                .trim_start()
                .chars()
                .next()
                .is_some_and(|c| c.to_ascii_uppercase() == letter)
        }) {
            print_profile(profile);
        }
    }
}
