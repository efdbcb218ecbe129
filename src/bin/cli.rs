//! cinevault CLI Client
//!
//! Command-line interface for interacting with a cinevault server. One
//! command per invocation; the interactive menu of the legacy client is
//! replaced by subcommands.

use clap::{Parser, Subcommand};

use cinevault::network::Client;
use cinevault::protocol::{Command, Status};

/// cinevault CLI
#[derive(Parser, Debug)]
#[command(name = "cinevault-cli")]
#[command(about = "CLI for the cinevault movie-record server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register a new movie
    Register {
        /// Title
        title: String,

        /// Director name
        director: String,

        /// Release year
        year: u32,

        /// Genres, `;`-separated (e.g. "action;sciFi")
        genres: String,
    },

    /// Append a genre to a movie
    AddGenre {
        /// Movie id
        id: u64,

        /// Genre to append
        genre: String,
    },

    /// Remove a movie
    Remove {
        /// Movie id
        id: u64,
    },

    /// List all movie ids and titles
    List,

    /// List full info for all movies
    ListAll,

    /// Show one movie
    Show {
        /// Movie id
        id: u64,
    },

    /// List movies whose genres contain the query
    ByGenre {
        /// Genre query (substring match)
        genre: String,
    },
}

fn main() {
    let args = Args::parse();

    let command = match args.command {
        Commands::Register {
            title,
            director,
            year,
            genres,
        } => Command::Register {
            title,
            director,
            year,
            genres: genres.split(';').map(str::to_string).collect(),
        },
        Commands::AddGenre { id, genre } => Command::AddGenre { id, genre },
        Commands::Remove { id } => Command::Remove { id },
        Commands::List => Command::ListIds,
        Commands::ListAll => Command::ListAll,
        Commands::Show { id } => Command::ListById { id },
        Commands::ByGenre { genre } => Command::ListByGenre { genre },
    };

    let mut client = match Client::connect(&args.server) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    match client.request(&command) {
        Ok(response) => {
            println!("{}", response.message);
            let exit_code = match response.status {
                Status::Ok => 0,
                Status::NotFound | Status::Error => 1,
            };
            let _ = client.quit();
            std::process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("request failed: {}", e);
            std::process::exit(1);
        }
    }
}
