//! Line commands over a single spreadsheet.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use sheetflow_core::{CellContents, Spreadsheet};

pub const HELP: &str = "\
commands:
  set <cell> [contents]   set a cell (number, text, or =formula); no contents clears it
  get <cell>              show a cell's value
  contents <cell>         show a cell's contents
  cells                   list non-empty cells with their values
  deps <cell>             list cells that reference <cell> directly
  save [path]             save to path, or to the file given at startup
  version <path>          show the version tag of a saved file
  help                    show this message
  quit                    leave the shell";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Set { cell: String, contents: String },
    Get(String),
    Contents(String),
    Cells,
    Deps(String),
    Save(Option<PathBuf>),
    Version(PathBuf),
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> anyhow::Result<Self> {
        let line = line.trim_start();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (line, ""),
        };
        let arg = || -> anyhow::Result<String> {
            let arg = rest.trim();
            if arg.is_empty() {
                bail!("'{}' needs an argument", word);
            }
            Ok(arg.to_string())
        };

        Ok(match word {
            "set" => {
                let (cell, contents) = match rest.split_once(char::is_whitespace) {
                    Some((cell, contents)) => (cell, contents.trim_end_matches(['\r', '\n'])),
                    None => (rest.trim_end(), ""),
                };
                if cell.is_empty() {
                    bail!("'set' needs a cell name");
                }
                Command::Set {
                    cell: cell.to_string(),
                    contents: contents.to_string(),
                }
            }
            "get" => Command::Get(arg()?),
            "contents" => Command::Contents(arg()?),
            "cells" => Command::Cells,
            "deps" => Command::Deps(arg()?),
            "save" => Command::Save(Some(rest.trim()).filter(|p| !p.is_empty()).map(PathBuf::from)),
            "version" => Command::Version(PathBuf::from(arg()?)),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(anyhow!("unknown command '{}', try 'help'", other)),
        })
    }
}

/// What the caller should do after a command
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Print(String),
    Quit,
}

pub struct Shell {
    sheet: Spreadsheet,
    path: Option<PathBuf>,
}

impl Shell {
    pub fn new(sheet: Spreadsheet, path: Option<PathBuf>) -> Self {
        Self { sheet, path }
    }

    pub fn sheet(&self) -> &Spreadsheet {
        &self.sheet
    }

    pub fn execute(&mut self, command: Command) -> anyhow::Result<Outcome> {
        let output = match command {
            Command::Set { cell, contents } => {
                let affected = self.sheet.set_contents_of_cell(&cell, &contents)?;
                let values = affected
                    .iter()
                    .map(|name| self.describe(name))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                values.join("\n")
            }
            Command::Get(cell) => self.sheet.cell_value(&cell)?.as_text(),
            Command::Contents(cell) => match self.sheet.cell_contents(&cell)? {
                CellContents::Text(s) if s.is_empty() => "(empty)".to_string(),
                contents => contents.to_input_string(),
            },
            Command::Cells => self
                .sheet
                .nonempty_cell_names()
                .iter()
                .map(|name| self.describe(name))
                .collect::<anyhow::Result<Vec<_>>>()?
                .join("\n"),
            Command::Deps(cell) => self.sheet.direct_dependents(&cell)?.join(" "),
            Command::Save(path) => {
                let path = path
                    .or_else(|| self.path.clone())
                    .context("no file to save to; use 'save <path>'")?;
                self.sheet.save(&path)?;
                let message = format!("saved {}", path.display());
                self.path = Some(path);
                message
            }
            Command::Version(path) => Spreadsheet::saved_version(&path)?,
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Print(output))
    }

    fn describe(&self, name: &str) -> anyhow::Result<String> {
        let value = self.sheet.cell_value(name)?;
        Ok(format!("{} = {}", name, value.as_text()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(shell: &mut Shell, line: &str) -> String {
        match shell.execute(line.parse().unwrap()).unwrap() {
            Outcome::Print(s) => s,
            Outcome::Quit => "<quit>".to_string(),
        }
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            "set A1 =B1 + 2".parse::<Command>().unwrap(),
            Command::Set {
                cell: "A1".into(),
                contents: "=B1 + 2".into()
            }
        );
        assert_eq!(
            "set A1".parse::<Command>().unwrap(),
            Command::Set {
                cell: "A1".into(),
                contents: String::new()
            }
        );
        assert_eq!("get  B2 ".parse::<Command>().unwrap(), Command::Get("B2".into()));
        assert_eq!("save".parse::<Command>().unwrap(), Command::Save(None));
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
        assert!("get".parse::<Command>().is_err());
        assert!("set".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
    }

    #[test]
    fn test_session() {
        let mut shell = Shell::new(Spreadsheet::new(), None);
        assert_eq!(run(&mut shell, "set A1 5"), "A1 = 5");
        assert_eq!(run(&mut shell, "set B1 =A1*2"), "B1 = 10");
        assert_eq!(run(&mut shell, "set A1 1"), "A1 = 1\nB1 = 2");
        assert_eq!(run(&mut shell, "contents B1"), "=A1*2");
        assert_eq!(run(&mut shell, "deps A1"), "B1");
        assert_eq!(run(&mut shell, "cells"), "A1 = 1\nB1 = 2");
        assert_eq!(run(&mut shell, "contents C9"), "(empty)");
        assert_eq!(run(&mut shell, "quit"), "<quit>");
    }

    #[test]
    fn test_errors_do_not_change_sheet() {
        let mut shell = Shell::new(Spreadsheet::new(), None);
        run(&mut shell, "set A1 =B1");
        assert!(shell.execute("set B1 =A1".parse().unwrap()).is_err());
        assert!(shell.execute("save".parse().unwrap()).is_err());
        assert_eq!(shell.sheet().nonempty_cell_names(), vec!["A1"]);
    }

    #[test]
    fn test_save_remembers_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let mut shell = Shell::new(Spreadsheet::new(), None);
        run(&mut shell, "set A1 3");
        run(&mut shell, &format!("save {}", path.display()));
        assert_eq!(run(&mut shell, "save"), format!("saved {}", path.display()));
        assert_eq!(run(&mut shell, &format!("version {}", path.display())), "default");
    }
}
