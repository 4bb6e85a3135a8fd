use mdict_engine::engine::assets::packed_containers;
use mdict_engine::engine::install::{discover, Installer};
use mdict_engine::EngineConfig;
use std::env;
use std::path::Path;

fn usage(program: &str) -> ! {
    eprintln!("Usage:");
    eprintln!("  {} install <name> <archive.zip> [--root <DIR> | --config <FILE.toml>]", program);
    eprintln!("  {} inspect <dictionary-folder>", program);
    std::process::exit(1);
}

const VALUE_FLAGS: &[&str] = &["--root", "--config"];

/// Arguments after the subcommand, with `--flag value` pairs removed.
fn positional(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = args.iter().skip(2);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else {
            out.push(arg.as_str());
        }
    }
    out
}

fn option_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let idx = args.iter().position(|arg| arg == flag)?;
    match args.get(idx + 1) {
        Some(value) => Some(value.as_str()),
        None => {
            eprintln!("ERROR: {} flag requires an argument.", flag);
            std::process::exit(1);
        }
    }
}

fn load_config(args: &[String]) -> EngineConfig {
    if let Some(path) = option_value(args, "--config") {
        match EngineConfig::from_toml_file(path) {
            Ok(config) => return config,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
    }
    match option_value(args, "--root") {
        Some(root) => EngineConfig::with_root(root),
        None => EngineConfig::default(),
    }
}

fn install(args: &[String]) {
    let [name, archive_path] = positional(args)[..] else {
        usage(&args[0]);
    };
    let config = load_config(args);

    let archive = match std::fs::read(archive_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("ERROR: Failed to read {}: {}", archive_path, e);
            std::process::exit(1);
        }
    };

    println!("Installing '{}' into {}", name, config.dict_root.display());
    println!("{}", "=".repeat(60));

    match Installer::new(&config).install(name, &archive) {
        Ok(installed) => {
            println!("  Folder: {}", installed.folder);
            println!("  Headword file: {}", installed.headword_file);
            println!("  Stylesheet: {}", installed.stylesheet_file.as_deref().unwrap_or("-"));
            println!("  Cover: {}", installed.cover_file.as_deref().unwrap_or("-"));
            println!("  Installed at: {}", installed.created_at.to_rfc3339());
        }
        Err(e) => {
            eprintln!("\nERROR: Install failed");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

fn inspect(args: &[String]) {
    let [folder] = positional(args)[..] else {
        usage(&args[0]);
    };
    let folder = Path::new(folder);

    println!("Inspecting dictionary folder: {}", folder.display());
    println!("{}", "=".repeat(60));

    match discover(folder) {
        Ok(layout) => {
            println!("  Headword file: {}", layout.headword_file);
            println!("  Stylesheet: {}", layout.stylesheet_file.as_deref().unwrap_or("-"));
            println!("  Cover: {}", layout.cover_file.as_deref().unwrap_or("-"));
            let containers = packed_containers(folder);
            println!("\nPacked-asset containers: {}", containers.len());
            for (i, container) in containers.iter().enumerate() {
                println!("  {}. {}", i + 1, container.display());
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Not a valid dictionary folder");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("install") => install(&args),
        Some("inspect") => inspect(&args),
        _ => usage(args.first().map(String::as_str).unwrap_or("mdict-engine")),
    }
}

#[cfg(test)]
mod tests {
    use super::positional;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_may_precede_positionals() {
        let argv = args(&["mdict-engine", "install", "--root", "/srv", "Oxford", "ox.zip"]);
        assert_eq!(positional(&argv), vec!["Oxford", "ox.zip"]);
    }

    #[test]
    fn flags_may_follow_positionals() {
        let argv = args(&["mdict-engine", "install", "Oxford", "ox.zip", "--config", "e.toml"]);
        assert_eq!(positional(&argv), vec!["Oxford", "ox.zip"]);
    }
}
