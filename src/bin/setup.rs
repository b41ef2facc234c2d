use std::env;

use anyhow::{anyhow, Context, Result};
use mediabase::library::{config_file_path, ensure_library_structure, load_or_default, save};
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

fn main() -> Result<()> {
    let args = CliArgs::parse()?;
    let paths = ensure_library_structure()?;
    let config_path = config_file_path()?;
    let mut config = load_or_default()?;
    let mut changed = !config_path.exists();

    if let Some(port) = args.port {
        if config.server.port != port {
            config.server.port = port;
            changed = true;
        }
    }
    if let Some(password) = args.password.as_deref() {
        config.server.admin_password_hash = Some(hash_password(password));
        changed = true;
    }
    if config.server.session_secret.is_none() {
        config.server.session_secret = Some(generate_secret());
        changed = true;
    }

    if changed {
        save(&config)?;
        println!("Configuration written to {}", config_path.display());
    } else {
        println!("Configuration already present at {}", config_path.display());
    }
    println!("Library directories ready under {}", paths.root.display());
    if config.server.admin_password_hash.is_none() {
        println!("No admin password set yet; rerun with --password <password>.");
    }
    Ok(())
}

struct CliArgs {
    password: Option<String>,
    port: Option<u16>,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut password = None;
        let mut port = None;
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--password" => {
                    let value = args.next().context("Expected a value after --password")?;
                    password = Some(value);
                }
                "--port" => {
                    let value = args.next().context("Expected a value after --port")?;
                    port = Some(
                        value
                            .parse::<u16>()
                            .with_context(|| format!("Invalid port '{value}'"))?,
                    );
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                other => {
                    return Err(anyhow!(
                        "Unknown argument '{other}'. Run with --help for usage instructions."
                    ));
                }
            }
        }
        Ok(Self { password, port })
    }
}

fn print_usage() {
    println!("mediabase setup");
    println!("Creates the library directories and records server settings in config.toml.");
    println!("Usage: cargo run --bin setup -- [options]");
    println!("Options:");
    println!("  --password <password>  Set the admin password (stored as a SHA-256 hash)");
    println!("  --port <port>          Set the HTTP port (default: 3000)");
}

fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..48).map(|_| rng.sample(Alphanumeric) as char).collect()
}
