use anyhow::{Context, Result, bail};
use markup_mentions_config::Config;
use markup_mentions_engine::{
    IdentityDisplay, InMentionPolicy, Markup, MentionSource, MentionsInput, PlainTextEdit,
    Suggestion, Trigger, apply_edit, extract_mentions, highlight, plain_to_markup_index, project,
};
use std::{env, path::Path, process};

const USAGE: &str = "\
Usage: markup-mentions <command> [args]

Commands:
  plain <value>
  stripped <value>
  mentions <value>
  map <value> <plain-index> [start|end|null]
  edit <value> <new-plain> <sel-start-before> <sel-end-before> <sel-end-after>
  suggest <value> <caret>";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Plain {
        value: String,
    },
    Stripped {
        value: String,
    },
    Mentions {
        value: String,
    },
    Map {
        value: String,
        plain_index: usize,
        policy: InMentionPolicy,
    },
    Edit {
        value: String,
        new_plain: String,
        selection_start_before: usize,
        selection_end_before: usize,
        selection_end_after: usize,
    },
    Suggest {
        value: String,
        caret: usize,
    },
}

impl Command {
    fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            bail!("missing command");
        };
        let command = match (name.as_str(), rest) {
            ("plain", [value]) => Command::Plain {
                value: value.clone(),
            },
            ("stripped", [value]) => Command::Stripped {
                value: value.clone(),
            },
            ("mentions", [value]) => Command::Mentions {
                value: value.clone(),
            },
            ("map", [value, index]) => Command::Map {
                value: value.clone(),
                plain_index: parse_offset(index)?,
                policy: InMentionPolicy::Null,
            },
            ("map", [value, index, policy]) => Command::Map {
                value: value.clone(),
                plain_index: parse_offset(index)?,
                policy: parse_policy(policy)?,
            },
            ("edit", [value, new_plain, start, end, after]) => Command::Edit {
                value: value.clone(),
                new_plain: new_plain.clone(),
                selection_start_before: parse_offset(start)?,
                selection_end_before: parse_offset(end)?,
                selection_end_after: parse_offset(after)?,
            },
            ("suggest", [value, caret]) => Command::Suggest {
                value: value.clone(),
                caret: parse_offset(caret)?,
            },
            (name, _) => bail!("unknown command or wrong arguments: {name}"),
        };
        Ok(command)
    }
}

fn parse_offset(arg: &str) -> Result<usize> {
    arg.parse()
        .with_context(|| format!("'{arg}' is not a valid offset"))
}

fn parse_policy(arg: &str) -> Result<InMentionPolicy> {
    match arg {
        "start" => Ok(InMentionPolicy::Start),
        "end" => Ok(InMentionPolicy::End),
        "null" => Ok(InMentionPolicy::Null),
        other => bail!("unknown policy '{other}', expected start, end or null"),
    }
}

fn load_suggestions(path: &Path) -> Result<Vec<Suggestion>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read suggestions file at {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse suggestions file at {}", path.display()))
}

/// Runs `command` and returns what it prints.
fn run(command: Command, config: &Config) -> Result<String> {
    let markup = Markup::new(&config.markup)?;

    let output = match command {
        Command::Plain { value } => project(&value, &markup, &IdentityDisplay).plain,
        Command::Stripped { value } => project(&value, &markup, &IdentityDisplay).stripped,
        Command::Mentions { value } => {
            serde_json::to_string_pretty(&extract_mentions(&value, &markup, &IdentityDisplay))?
        }
        Command::Map {
            value,
            plain_index,
            policy,
        } => match plain_to_markup_index(&value, &markup, plain_index, policy, &IdentityDisplay) {
            Some(index) => index.to_string(),
            None => "null".to_string(),
        },
        Command::Edit {
            value,
            new_plain,
            selection_start_before,
            selection_end_before,
            selection_end_after,
        } => {
            let edit = PlainTextEdit::new(
                &new_plain,
                selection_start_before,
                selection_end_before,
                selection_end_after,
            );
            apply_edit(&value, &markup, &edit, &IdentityDisplay)
        }
        Command::Suggest { value, caret } => suggest(&value, caret, markup, config)?,
    };
    Ok(output)
}

fn suggest(value: &str, caret: usize, markup: Markup, config: &Config) -> Result<String> {
    let suggestions = match &config.suggestions_path {
        Some(path) => load_suggestions(path)?,
        None => {
            log::warn!("No suggestions_path configured, nothing to suggest from");
            Vec::new()
        }
    };
    let source = MentionSource::new(
        config.kind.clone(),
        &Trigger::Char(config.trigger.clone()),
        config.allow_space_in_query,
        Box::new(suggestions),
    )?
    .append_space_on_add(config.append_space_on_add);

    let mut input = MentionsInput::new(markup).with_source(source);
    let plain = input.plain_text(value);
    input.handle_select(value, &plain, caret, caret);

    let mut lines = Vec::new();
    for group in input.suggestions().groups() {
        log::info!(
            "query '{}' at [{}, {})",
            group.query.query,
            group.query.start,
            group.query.end
        );
        for suggestion in &group.results {
            let parts = highlight(suggestion.display_text(), &group.query.query);
            lines.push(format!(
                "{}\t{}[{}]{}",
                suggestion.id, parts.before, parts.matched, parts.after
            ));
        }
    }
    Ok(lines.join("\n"))
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{USAGE}");
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(Some(config)) => {
            log::debug!("Loaded config from {}", config_path.display());
            config
        }
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    match run(command, &config) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("Config file: {}", config_path.display());
            process::exit(1);
        }
    }
}
