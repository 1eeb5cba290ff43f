use std::time::Duration;

use clap::{Parser, Subcommand};
use recipe_sdk::types::{AccountUpdate, NewReview, ReviewUpdate};
use recipe_sdk::{RecipeClient, SdkError, Session};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "recipe-cli")]
#[command(about = "Command-line client for the recipe gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "RECIPE_GATEWAY_URL", default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token from a previous `login`.
    #[arg(short, long, env = "RECIPE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Client-side timeout in seconds; keep it above the gateway's generation bound.
    #[arg(long, default_value_t = 330)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and print an access token
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show the signed-in user
    Me,
    /// Describe what you want and generate a recipe for it
    Generate {
        /// Free-text requirement, e.g. "vegetarian, 20 minutes, uses leeks"
        prompt: String,
    },
    /// List community recipes
    Recipes,
    /// Show one recipe with its reviews
    Recipe { id: i64 },
    /// Toggle a recipe in your favorites
    Save { id: i64 },
    /// List your favorites
    Favorites,
    /// Review a recipe
    Review {
        id: i64,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(short, long, default_value = "")]
        content: String,
    },
    /// Rewrite one of your reviews
    EditReview {
        review_id: i64,
        #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(short, long)]
        content: String,
    },
    /// Delete one of your reviews
    DeleteReview { review_id: i64 },
    /// Show the preferences sent along with every generation
    Preferences,
    /// Replace your preferences; omit the text to clear them
    SetPreferences {
        #[arg(default_value = "")]
        text: String,
    },
    /// Change username or email, confirmed with the current password
    UpdateAccount {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        current_password: String,
    },
    /// Permanently delete your account
    DeleteAccount,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        if let SdkError::Api {
            details: Some(details),
            ..
        } = &e
        {
            eprintln!("Details: {details}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), SdkError> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()?;
    let client = RecipeClient::with_client(http, &cli.url);
    let mut session = cli.token.map(Session::with_token).unwrap_or_default();

    match cli.command {
        Commands::Login { username, password } => {
            let profile = client.login(&mut session, &username, &password).await?;
            eprintln!("Signed in as {}", profile.username);
            if let Some(token) = session.token() {
                println!("{token}");
            }
        }
        Commands::Me => print_json(&client.me(&session).await?),
        Commands::Generate { prompt } => {
            eprintln!("Generating, this may take up to 5 minutes...");
            print_json(&client.generate_from_prompt(&session, &prompt).await?);
        }
        Commands::Recipes => print_json(&client.list_recipes().await?),
        Commands::Recipe { id } => print_json(&client.get_recipe(id).await?),
        Commands::Save { id } => {
            let toggle = client.save_recipe(&session, id).await?;
            println!("{}", if toggle.saved { "saved" } else { "removed" });
        }
        Commands::Favorites => print_json(&client.saved_recipes(&session).await?),
        Commands::Review {
            id,
            rating,
            content,
        } => {
            let review = NewReview {
                recipe_id: id,
                content,
                rating,
            };
            print_json(&client.post_review(&session, &review).await?);
        }
        Commands::EditReview {
            review_id,
            rating,
            content,
        } => {
            let update = ReviewUpdate { content, rating };
            print_json(&client.update_review(&session, review_id, &update).await?);
        }
        Commands::DeleteReview { review_id } => {
            client.delete_review(&session, review_id).await?;
            println!("deleted");
        }
        Commands::Preferences => print_json(&client.preferences(&session).await?),
        Commands::SetPreferences { text } => {
            print_json(&client.update_preferences(&session, &text).await?)
        }
        Commands::UpdateAccount {
            username,
            email,
            current_password,
        } => {
            let update = AccountUpdate {
                username,
                email,
                current_password,
            };
            if update.is_empty() {
                eprintln!("Nothing to change");
                return Ok(());
            }
            let profile = client.me(&session).await?;
            print_json(&client.update_account(&session, profile.id, &update).await?);
        }
        Commands::DeleteAccount => {
            let profile = client.me(&session).await?;
            client.delete_account(&mut session, profile.id).await?;
            println!("account {} deleted", profile.username);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("Error: cannot render response: {e}"),
    }
}
