/// Shell commands, argument parsing and autocomplete logic

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
  Decode,
  Show,
  History,
  Favorites,
  Search,
  Favorite,
  Unfavorite,
  Delete,
  Clear,
  Models,
  Count,
  Help,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub kind: CommandKind,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub usage: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    kind: CommandKind::Decode,
    name: "decode",
    aliases: &["d", "dec"],
    usage: "decode <vin> [--extended]",
    description: "Decode a VIN via the registry",
  },
  Command {
    kind: CommandKind::Show,
    name: "show",
    aliases: &["s", "info"],
    usage: "show <vin>",
    description: "Show a cached VIN",
  },
  Command {
    kind: CommandKind::History,
    name: "history",
    aliases: &["h", "ls", "list"],
    usage: "history",
    description: "List decoded VINs",
  },
  Command {
    kind: CommandKind::Favorites,
    name: "favorites",
    aliases: &["fav", "favs"],
    usage: "favorites",
    description: "List favorite VINs",
  },
  Command {
    kind: CommandKind::Search,
    name: "search",
    aliases: &["find", "/"],
    usage: "search <text>",
    description: "Search history by VIN, make, model or year",
  },
  Command {
    kind: CommandKind::Favorite,
    name: "favorite",
    aliases: &["star", "f"],
    usage: "favorite <vin>",
    description: "Mark a VIN as favorite",
  },
  Command {
    kind: CommandKind::Unfavorite,
    name: "unfavorite",
    aliases: &["unstar", "uf"],
    usage: "unfavorite <vin>",
    description: "Remove a VIN from favorites",
  },
  Command {
    kind: CommandKind::Delete,
    name: "delete",
    aliases: &["del", "rm"],
    usage: "delete <vin>",
    description: "Delete a VIN from history",
  },
  Command {
    kind: CommandKind::Clear,
    name: "clear",
    aliases: &["purge"],
    usage: "clear",
    description: "Delete the whole history",
  },
  Command {
    kind: CommandKind::Models,
    name: "models",
    aliases: &["m"],
    usage: "models <make> <year>",
    description: "List models for a make and year",
  },
  Command {
    kind: CommandKind::Count,
    name: "count",
    aliases: &["n"],
    usage: "count",
    description: "Number of stored VINs",
  },
  Command {
    kind: CommandKind::Help,
    name: "help",
    aliases: &["?"],
    usage: "help",
    description: "Show this list",
  },
  Command {
    kind: CommandKind::Quit,
    name: "quit",
    aliases: &["q", "exit"],
    usage: "quit",
    description: "Exit the shell",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  ranked_matches(input)
    .into_iter()
    .map(|(cmd, _)| cmd)
    .collect()
}

/// Matching commands with their priority, best first. Lower is better:
/// 0 exact name, 1 exact alias, 2-3 prefix, 4-5 substring.
fn ranked_matches(input: &str) -> Vec<(&'static Command, u32)> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().map(|cmd| (cmd, 0)).collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches
}

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
  pub kind: CommandKind,
  pub args: Vec<String>,
}

/// Split a line into a command and its arguments.
///
/// The first word may be a name, an alias, or a prefix or substring that
/// picks out a single command. Exact names and aliases always win. A partial
/// word that fits several commands equally well is rejected rather than
/// guessed. Returns `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<Invocation>, String> {
  let mut words = line.split_whitespace();
  let Some(first) = words.next() else {
    return Ok(None);
  };

  let matches = ranked_matches(first);
  let &(command, best) = matches
    .first()
    .ok_or_else(|| format!("Unknown command: {}", first))?;

  if best >= 2 {
    let tied: Vec<&str> = matches
      .iter()
      .filter(|(_, priority)| *priority == best)
      .map(|(cmd, _)| cmd.name)
      .collect();
    if tied.len() > 1 {
      return Err(format!(
        "Ambiguous command: {} ({})",
        first,
        tied.join(", ")
      ));
    }
  }

  let args: Vec<String> = words.map(String::from).collect();

  let (min, max) = arity(command.kind);
  if args.len() < min || args.len() > max {
    return Err(format!("Usage: {}", command.usage));
  }

  Ok(Some(Invocation {
    kind: command.kind,
    args,
  }))
}

/// Allowed argument count for each command.
fn arity(kind: CommandKind) -> (usize, usize) {
  match kind {
    CommandKind::Decode => (1, 2),
    CommandKind::Show
    | CommandKind::Favorite
    | CommandKind::Unfavorite
    | CommandKind::Delete => (1, 1),
    // Search text may contain spaces
    CommandKind::Search => (1, usize::MAX),
    CommandKind::Models => (2, 2),
    CommandKind::History
    | CommandKind::Favorites
    | CommandKind::Clear
    | CommandKind::Count
    | CommandKind::Help
    | CommandKind::Quit => (0, 0),
  }
}
