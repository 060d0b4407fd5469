// src/bin/vaultctl.rs
//! vaultctl — operator front-end for envelope-vault
//!
//! Configuration comes from `$VAULT_CONFIG` (default `vault.toml`) plus
//! `VAULT_*` env overrides. Set `RUST_LOG` for more detail.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use envelope_vault::{Config, Vault};
use rpassword::prompt_password;
use tracing::info;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: vaultctl <command> [args]

  add <category> <name> <value>   store or replace a secret
  get <category> <name>           print a secret
  list [category]                 list secrets (metadata only)
  delete <category> <name>        remove a secret
  rotate                          re-encrypt every secret under a fresh key
  upload <path>                   encrypt and store a file
  download <name> [dest]          fetch, decrypt and verify a file
  files                           list stored files
  audit [limit]                   show recent audit entries
  report                          storage summary";

fn arg(args: &[String], idx: usize, what: &str) -> Result<String> {
    args.get(idx)
        .cloned()
        .with_context(|| format!("missing <{what}>\n\n{USAGE}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{USAGE}");
        return Ok(());
    };

    let mut config = Config::load().context("failed to load configuration")?;
    if config.keys.db_key.is_none() {
        let key = prompt_password("Vault database key: ").context("failed to read database key")?;
        config.keys.db_key = Some(key);
    }
    let vault = Vault::open(config).context("failed to open vault")?;

    match command {
        "add" => {
            let (category, name) = (arg(&args, 1, "category")?, arg(&args, 2, "name")?);
            vault.secrets().add(&category, &name, &arg(&args, 3, "value")?)?;
            info!("stored {category}/{name}");
        }
        "get" => {
            let value = vault
                .secrets()
                .get(&arg(&args, 1, "category")?, &arg(&args, 2, "name")?)?;
            println!("{}", value.expose_secret());
        }
        "list" => {
            for s in vault.secrets().list(args.get(1).map(String::as_str))? {
                println!(
                    "{}/{}\t{}\tcreated {}\tupdated {}",
                    s.category,
                    s.name,
                    s.mode,
                    s.created_at.to_rfc3339(),
                    s.updated_at.to_rfc3339()
                );
            }
        }
        "delete" => {
            let (category, name) = (arg(&args, 1, "category")?, arg(&args, 2, "name")?);
            if vault.secrets().delete(&category, &name)? {
                info!("deleted {category}/{name}");
            } else {
                info!("{category}/{name} did not exist");
            }
        }
        "rotate" => {
            let report = vault.rotate()?;
            println!("rotated {} of {} secret(s)", report.rotated, report.total);
            for failure in &report.failed {
                eprintln!("  failed {}/{}: {}", failure.category, failure.name, failure.error);
            }
            if !report.is_clean() {
                bail!("{} secret(s) could not be rotated", report.failed.len());
            }
        }
        "upload" => {
            let receipt = vault.files().upload(arg(&args, 1, "path")?)?;
            println!(
                "{} uploaded ({} bytes, {}, sha256 {})",
                receipt.name,
                receipt.size,
                receipt.location,
                receipt.digest.as_deref().unwrap_or("n/a")
            );
        }
        "download" => {
            let name = arg(&args, 1, "name")?;
            let dest = args
                .get(2)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(format!("decrypted_{name}")));
            let receipt = vault.files().download(&name, &dest)?;
            println!(
                "{} → {} ({} bytes)",
                receipt.name,
                receipt.destination.display(),
                receipt.size
            );
        }
        "files" => {
            for f in vault.list_files()? {
                println!(
                    "{}\t{}\t{} bytes\t{}\t{}",
                    f.filename,
                    f.uploaded_at.to_rfc3339(),
                    f.size,
                    f.location,
                    f.mode
                );
            }
        }
        "audit" => {
            let limit = match args.get(1) {
                Some(raw) => Some(raw.parse().context("limit must be a number")?),
                None => None,
            };
            for a in vault.list_audit(limit)? {
                println!(
                    "{} {} {} -> {} success={} {}",
                    a.ts.to_rfc3339(),
                    a.action,
                    a.target,
                    a.location,
                    a.success,
                    a.error.unwrap_or_default()
                );
            }
        }
        "report" => print!("{}", vault.report()?),
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }

    Ok(())
}
