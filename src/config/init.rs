use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::config::{get_config_path, validate_config, Config, SetDefinition, DEFAULT_SET_COUNT};
use crate::scoring::ItemLimits;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
pub fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Prompt until the answer parses as a count of at least `min`.
fn prompt_count(message: &str, default: usize, min: usize) -> Result<usize> {
    loop {
        let input = prompt_with_default(message, &default.to_string())?;
        match input.parse::<usize>() {
            Ok(v) if v >= min => return Ok(v),
            Ok(_) => println!("  Invalid: must be at least {}. Try again.", min),
            Err(_) => println!("  Invalid: must be a whole number. Try again."),
        }
    }
}

/// Print text with a typewriter effect, one character at a time.
fn typewriter(text: &str) {
    use std::thread;
    use std::time::Duration;
    for c in text.chars() {
        print!("{}", c);
        std::io::stdout().flush().ok();
        thread::sleep(Duration::from_millis(18));
    }
    println!();
}

/// Set definitions `set1..setN` carrying the given titles. Blank titles fall
/// back to the id when displayed.
pub fn sets_from_titles(titles: &[String]) -> Vec<SetDefinition> {
    titles
        .iter()
        .enumerate()
        .map(|(i, title)| SetDefinition {
            id: format!("set{}", i + 1),
            title: if title.trim().is_empty() {
                None
            } else {
                Some(title.trim().to_string())
            },
        })
        .collect()
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("Wine Rater Configuration Wizard");
    println!("===============================");
    println!();

    // 1. Wine count limits
    typewriter("Each set holds between a minimum and a maximum number of wines.");
    let defaults = ItemLimits::default();
    let limits = loop {
        let min_items = prompt_count("Minimum wines per set", defaults.min_items, 1)?;
        let max_items = prompt_count("Maximum wines per set", defaults.max_items.max(min_items), 1)?;
        if min_items <= max_items {
            break ItemLimits {
                min_items,
                max_items,
            };
        }
        println!("  Invalid: the maximum must not be below the minimum. Try again.");
    };

    // 2. Sets
    println!();
    typewriter("Wines are rated in independent sets, for example one per flight.");
    let set_count = prompt_count("Number of sets", DEFAULT_SET_COUNT, 1)?;
    let mut titles = Vec::with_capacity(set_count);
    for n in 1..=set_count {
        titles.push(prompt_with_default(
            &format!("  Title for set {}", n),
            &format!("セット{}", n),
        )?);
    }

    // 3. Config path
    let default_config_path = default_path.unwrap_or_else(get_config_path);
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    // Check if file already exists
    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 4. Write config
    let config = Config {
        limits,
        sets: sets_from_titles(&titles),
        ..Config::default()
    };
    if let Err(errors) = validate_config(&config) {
        anyhow::bail!("Generated config is invalid: {}", errors.join("; "));
    }

    let yaml = serde_saphyr::to_string(&config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    std::fs::write(&config_path, &yaml)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `wine-rater` to get started.");

    Ok(())
}
