// 💻 Console - line-oriented front-end over the storage engine
//
// Verbs: create, show, destroy, all, count, update, help, quit, EOF
// Dot form: <Class>.all(), <Class>.count(), <Class>.show("id"),
//           <Class>.destroy("id"), <Class>.update("id", "attr", "value"),
//           <Class>.update("id", {"attr": value, ...})
//
// Every mutating verb saves the whole registry before returning.

use anyhow::Result;
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::debug;

use crate::entities::base::registry_key;
use crate::entities::{Entity, EntityKind, Record};
use crate::error::Error;
use crate::storage::FileStorage;

pub const PROMPT: &str = "(hbnb) ";

const CLASS_MISSING: &str = "** class name missing **";
const CLASS_UNKNOWN: &str = "** class doesn't exist **";
const ID_MISSING: &str = "** instance id missing **";
const NOT_FOUND: &str = "** no instance found **";
const ATTRIBUTE_MISSING: &str = "** attribute name missing **";
const VALUE_MISSING: &str = "** value missing **";
const VALUE_INVALID: &str = "** invalid value **";
const READ_ONLY: &str = "** attribute can't be updated **";

const COMMANDS: [(&str, &str); 9] = [
    ("EOF", "Exit the console on end of input"),
    ("all", "Print every instance, or every instance of a class: all [<class>]"),
    ("count", "Print the number of instances of a class: count <class>"),
    ("create", "Create and save a new instance, print its id: create <class>"),
    ("destroy", "Delete an instance and save: destroy <class> <id>"),
    ("help", "List commands, or describe one: help [<command>]"),
    ("quit", "Exit the console"),
    ("show", "Print one instance: show <class> <id>"),
    ("update", "Set one attribute and save: update <class> <id> <attribute> \"<value>\""),
];

// ============================================================================
// CONSOLE
// ============================================================================

pub struct Console<'s, W: Write> {
    storage: &'s mut FileStorage,
    out: W,
}

impl<'s, W: Write> Console<'s, W> {
    pub fn new(storage: &'s mut FileStorage, out: W) -> Self {
        Console { storage, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Read commands until `quit` or end of input.
    pub fn run<R: BufRead>(&mut self, input: R, interactive: bool) -> Result<()> {
        let mut lines = input.lines();
        loop {
            if interactive {
                write!(self.out, "{PROMPT}")?;
                self.out.flush()?;
            }
            let line = match lines.next() {
                Some(line) => line?,
                None => "EOF".to_string(),
            };
            if self.onecmd(&line)? {
                return Ok(());
            }
        }
    }

    /// Execute one line. Returns true when the session should end.
    pub fn onecmd(&mut self, line: &str) -> Result<bool> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(false);
        }
        debug!(command = %line, "console command");

        if let Some(call) = DotCall::parse(line) {
            return self.dispatch_dot(line, call).map(|_| false);
        }

        let args = split_args(line);
        let (command, rest) = match args.split_first() {
            Some((command, rest)) => (command.as_str(), rest),
            None => return Ok(false),
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

        match command {
            "quit" => return Ok(true),
            "EOF" => {
                writeln!(self.out)?;
                return Ok(true);
            }
            "help" => self.help(rest.first().copied())?,
            "create" => self.create(&rest)?,
            "show" => self.show(&rest)?,
            "destroy" => self.destroy(&rest)?,
            "all" => self.all(&rest)?,
            "count" => self.count(&rest)?,
            "update" => self.update(&rest)?,
            _ => writeln!(self.out, "*** Unknown syntax: {line}")?,
        }
        Ok(false)
    }

    // ========================================================================
    // VERBS
    // ========================================================================

    fn help(&mut self, topic: Option<&str>) -> Result<()> {
        match topic {
            None => {
                let names: Vec<&str> = COMMANDS.iter().map(|(name, _)| *name).collect();
                writeln!(self.out)?;
                writeln!(self.out, "Documented commands (type help <topic>):")?;
                writeln!(self.out, "========================================")?;
                writeln!(self.out, "{}", names.join("  "))?;
                writeln!(self.out)?;
            }
            Some(topic) => match COMMANDS.iter().find(|(name, _)| *name == topic) {
                Some((_, description)) => writeln!(self.out, "{description}")?,
                None => writeln!(self.out, "*** No help on {topic}")?,
            },
        }
        Ok(())
    }

    fn create(&mut self, args: &[&str]) -> Result<()> {
        let Some(kind) = self.class_arg(args)? else {
            return Ok(());
        };
        let entity = Entity::create(kind, self.storage);
        let (key, id) = (entity.key(), entity.id().to_string());
        self.storage.save_entity(&key)?;
        writeln!(self.out, "{id}")?;
        Ok(())
    }

    fn show(&mut self, args: &[&str]) -> Result<()> {
        let Some(key) = self.instance_arg(args)? else {
            return Ok(());
        };
        if let Some(entity) = self.storage.get(&key) {
            writeln!(self.out, "{entity}")?;
        }
        Ok(())
    }

    fn destroy(&mut self, args: &[&str]) -> Result<()> {
        let Some(key) = self.instance_arg(args)? else {
            return Ok(());
        };
        self.storage.delete(&key);
        self.storage.save()?;
        Ok(())
    }

    fn all(&mut self, args: &[&str]) -> Result<()> {
        let shown: Vec<String> = match args.first() {
            None => self.storage.all().values().map(Entity::to_string).collect(),
            Some(class) => match class.parse::<EntityKind>() {
                Ok(kind) => self.storage.by_kind(kind).map(Entity::to_string).collect(),
                Err(_) => {
                    writeln!(self.out, "{CLASS_UNKNOWN}")?;
                    return Ok(());
                }
            },
        };
        writeln!(self.out, "{}", serde_json::to_string(&shown)?)?;
        Ok(())
    }

    fn count(&mut self, args: &[&str]) -> Result<()> {
        let Some(kind) = self.class_arg(args)? else {
            return Ok(());
        };
        writeln!(self.out, "{}", self.storage.count(kind))?;
        Ok(())
    }

    fn update(&mut self, args: &[&str]) -> Result<()> {
        let Some(key) = self.instance_arg(args)? else {
            return Ok(());
        };
        let Some(name) = args.get(2) else {
            writeln!(self.out, "{ATTRIBUTE_MISSING}")?;
            return Ok(());
        };
        let Some(raw) = args.get(3) else {
            writeln!(self.out, "{VALUE_MISSING}")?;
            return Ok(());
        };

        let outcome = match self.storage.get_mut(&key) {
            Some(entity) => entity.set_attribute_from_str(name, raw),
            None => Err(Error::NotFound(key.clone())),
        };
        self.finish_update(&key, outcome)
    }

    /// `<Class>.update("id", {...})`: every pair is applied as a typed JSON value.
    fn update_from_map(&mut self, args: &[&str], attributes: Record) -> Result<()> {
        let Some(key) = self.instance_arg(args)? else {
            return Ok(());
        };

        // Applied to a copy; the registered entity changes only if every pair is accepted.
        let staged = match self.storage.get(&key) {
            Some(entity) => {
                let mut staged = entity.clone();
                attributes
                    .into_iter()
                    .try_for_each(|(name, value)| staged.set_attribute(&name, value))
                    .map(|()| staged)
            }
            None => Err(Error::NotFound(key.clone())),
        };
        let outcome = staged.map(|staged| {
            self.storage.register(staged);
        });
        self.finish_update(&key, outcome)
    }

    fn finish_update(&mut self, key: &str, outcome: crate::error::Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => self.storage.save_entity(key)?,
            Err(Error::ReadOnlyAttribute(_)) => writeln!(self.out, "{READ_ONLY}")?,
            Err(Error::InvalidRecord { .. }) => writeln!(self.out, "{VALUE_INVALID}")?,
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    fn dispatch_dot(&mut self, line: &str, call: DotCall) -> Result<()> {
        let mut args = vec![call.class.to_string()];
        args.extend(split_call_args(call.args));

        if call.method == "update" && args.len() >= 3 && args[2].starts_with('{') {
            let joined = args[2..].join(", ");
            let args: Vec<&str> = args[..2].iter().map(String::as_str).collect();
            return match serde_json::from_str::<Value>(&joined) {
                Ok(Value::Object(attributes)) => self.update_from_map(&args, attributes),
                _ => {
                    writeln!(self.out, "{VALUE_INVALID}")?;
                    Ok(())
                }
            };
        }

        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match call.method {
            "all" => self.all(&args),
            "count" => self.count(&args),
            "show" => self.show(&args),
            "destroy" => self.destroy(&args),
            "update" => self.update(&args),
            _ => {
                writeln!(self.out, "*** Unknown syntax: {line}")?;
                Ok(())
            }
        }
    }

    // ========================================================================
    // ARGUMENT CHECKS (print the error and return None)
    // ========================================================================

    fn class_arg(&mut self, args: &[&str]) -> Result<Option<EntityKind>> {
        let Some(class) = args.first() else {
            writeln!(self.out, "{CLASS_MISSING}")?;
            return Ok(None);
        };
        match class.parse::<EntityKind>() {
            Ok(kind) => Ok(Some(kind)),
            Err(_) => {
                writeln!(self.out, "{CLASS_UNKNOWN}")?;
                Ok(None)
            }
        }
    }

    /// Class + id that name a registered instance; yields its registry key.
    fn instance_arg(&mut self, args: &[&str]) -> Result<Option<String>> {
        let Some(kind) = self.class_arg(args)? else {
            return Ok(None);
        };
        let Some(id) = args.get(1) else {
            writeln!(self.out, "{ID_MISSING}")?;
            return Ok(None);
        };
        let key = registry_key(kind, id);
        if self.storage.get(&key).is_none() {
            writeln!(self.out, "{NOT_FOUND}")?;
            return Ok(None);
        }
        Ok(Some(key))
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// `<Class>.<method>(<args>)`
#[derive(Debug, PartialEq)]
struct DotCall<'a> {
    class: &'a str,
    method: &'a str,
    args: &'a str,
}

impl<'a> DotCall<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        let (head, rest) = line.split_once('(')?;
        let args = rest.strip_suffix(')')?;
        let (class, method) = head.split_once('.')?;
        if class.is_empty() || class.contains(char::is_whitespace) || method.is_empty() {
            return None;
        }
        Some(DotCall { class, method, args })
    }
}

/// Whitespace-separated words; double quotes group words and are dropped.
fn split_args(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

/// Comma-separated call arguments. Quotes are stripped; commas inside quotes
/// or braces don't split.
fn split_call_args(args: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut depth = 0usize;

    for c in args.chars() {
        match c {
            '"' if depth == 0 => quoted = !quoted,
            '{' if !quoted => {
                depth += 1;
                current.push(c);
            }
            '}' if !quoted => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if !quoted && depth == 0 => {
                parts.push(std::mem::take(&mut current).trim().to_string());
            }
            c => current.push(c),
        }
    }
    let last = current.trim();
    if !last.is_empty() || !parts.is_empty() {
        parts.push(last.to_string());
    }
    parts
}

// ============================================================================
// TESTS
// ============================================================================
