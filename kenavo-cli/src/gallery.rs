use clap::Subcommand;
use colored::Colorize;
use kenavo_lib::{
    ApiClient, Cfg, Error, Result,
    gallery::{GalleryAlbum, LoadOutcome, album_loader},
};

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List albums, following pages like the gallery's infinite scroll
    Albums {
        /// Keep loading past the auto-load limit until every page is fetched
        #[arg(short, long)]
        all: bool,
    },
}

pub async fn handle(cfg: &Cfg, cmd: &Command) -> Result<()> {
    match cmd {
        Command::Albums { all } => {
            let client = ApiClient::from_config(cfg)?;
            let loader = album_loader(client, cfg);

            let mut outcome = loader.load_initial().await;
            while matches!(outcome, LoadOutcome::Appended(_) | LoadOutcome::Replaced(_)) {
                outcome = loader.on_visible().await;
            }

            if *all {
                while outcome != LoadOutcome::Failed && loader.snapshot().has_more() {
                    outcome = loader.load_more().await;
                }
            }

            let state = loader.snapshot();
            for album in state.items() {
                print_album(album);
            }
            println!(
                "{}",
                format!("{} of {} albums", state.items().len(), state.total()).dimmed()
            );

            if let Some(message) = state.error() {
                return Err(Error::PageLoad(message.clone()));
            }

            if state.has_more() {
                println!("{}", "More albums available, pass --all to load them".dimmed());
            }
        }
    }

    Ok(())
}

fn print_album(album: &GalleryAlbum) {
    println!(
        "{} {} {}",
        album.name.bold(),
        format!("/gallery/{}", album.slug).cyan(),
        format!("{} photos", album.image_count).dimmed()
    );
}
