//! # Script Commands
//!
//! One parsed script line.
//!
//! ## Grammar
//! ```text
//! participant add NAME
//! participant rename OLD NEW
//! participant remove NAME
//! category add NAME PERCENT
//! item add NAME PRICE [QTY] [category=C] [for=A,B] [split=A:1,B:2] [qty=Q]
//! item edit N [name=..] [price=..] [qty=..] [category=..] [for=..] [split=..]
//! item remove|exclude|include N          (N is the 1-based position in `list`)
//! mode taxable_only|uniform
//! undo | redo | reset | list
//! calc [PERCENT]
//! export FILE
//! import FILE [A,B]                       (.txt is receipt text, anything else CSV)
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use billsplit_core::{CoreError, DiscountMode, Money, ValidationError};

use crate::error::{CliError, CliResult};
use crate::script::lexer::tokenize;

/// Fields an `item` command may set. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFields {
    pub name: Option<String>,
    pub unit_price: Option<Money>,
    pub quantity: Option<i64>,
    pub category: Option<String>,
    pub participants: Option<Vec<String>>,
    pub split: Vec<(String, f64)>,
}

impl ItemFields {
    /// Whether anything that decides the split was given.
    pub fn touches_split(&self) -> bool {
        self.quantity.is_some() || self.participants.is_some() || !self.split.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    AddParticipant(String),
    RenameParticipant { from: String, to: String },
    RemoveParticipant(String),
    AddCategory { name: String, tax_rate_percent: f64 },
    AddItem {
        name: String,
        unit_price: Money,
        fields: ItemFields,
    },
    EditItem { position: usize, fields: ItemFields },
    RemoveItem(usize),
    ExcludeItem(usize),
    IncludeItem(usize),
    SetMode(DiscountMode),
    Undo,
    Redo,
    Calc { discount_percent: Option<f64> },
    Export(PathBuf),
    Import { path: PathBuf, participants: Option<Vec<String>> },
    Reset,
    List,
}

impl ScriptCommand {
    /// Parses one line; `Ok(None)` for blank and comment lines.
    pub fn parse(line_no: usize, line: &str) -> CliResult<Option<Self>> {
        let words = tokenize(line).map_err(|message| CliError::syntax(line_no, message))?;
        if words.is_empty() {
            return Ok(None);
        }
        Parser { line_no, words }.command().map(Some)
    }
}

struct Parser {
    line_no: usize,
    words: Vec<String>,
}

impl Parser {
    fn syntax(&self, message: impl Into<String>) -> CliError {
        CliError::syntax(self.line_no, message)
    }

    fn word(&self, index: usize, what: &str) -> CliResult<&str> {
        self.words
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.syntax(format!("missing {}", what)))
    }

    fn expect_len(&self, max: usize) -> CliResult<()> {
        match self.words.get(max) {
            Some(extra) => Err(self.syntax(format!("unexpected argument '{}'", extra))),
            None => Ok(()),
        }
    }

    fn command(&self) -> CliResult<ScriptCommand> {
        let head = self.words[0].to_ascii_lowercase();
        match head.as_str() {
            "participant" => self.participant(),
            "category" => self.category(),
            "item" => self.item(),
            "mode" => {
                self.expect_len(2)?;
                let mode = DiscountMode::from_str(self.word(1, "discount mode")?).map_err(invalid)?;
                Ok(ScriptCommand::SetMode(mode))
            }
            "undo" | "redo" | "reset" | "list" => {
                self.expect_len(1)?;
                Ok(match head.as_str() {
                    "undo" => ScriptCommand::Undo,
                    "redo" => ScriptCommand::Redo,
                    "reset" => ScriptCommand::Reset,
                    _ => ScriptCommand::List,
                })
            }
            "calc" => {
                self.expect_len(2)?;
                let discount_percent = match self.words.get(1) {
                    Some(word) => Some(parse_percent("discount", word)?),
                    None => None,
                };
                Ok(ScriptCommand::Calc { discount_percent })
            }
            "export" => {
                self.expect_len(2)?;
                Ok(ScriptCommand::Export(PathBuf::from(self.word(1, "file")?)))
            }
            "import" => {
                self.expect_len(3)?;
                let path = PathBuf::from(self.word(1, "file")?);
                let participants = self.words.get(2).map(|list| split_names(list));
                Ok(ScriptCommand::Import { path, participants })
            }
            _ => Err(self.syntax(format!("unknown command '{}'", self.words[0]))),
        }
    }

    fn participant(&self) -> CliResult<ScriptCommand> {
        match self.word(1, "participant action")? {
            "add" => {
                self.expect_len(3)?;
                Ok(ScriptCommand::AddParticipant(self.word(2, "name")?.to_string()))
            }
            "rename" => {
                self.expect_len(4)?;
                Ok(ScriptCommand::RenameParticipant {
                    from: self.word(2, "current name")?.to_string(),
                    to: self.word(3, "new name")?.to_string(),
                })
            }
            "remove" => {
                self.expect_len(3)?;
                Ok(ScriptCommand::RemoveParticipant(self.word(2, "name")?.to_string()))
            }
            other => Err(self.syntax(format!("unknown participant action '{}'", other))),
        }
    }

    fn category(&self) -> CliResult<ScriptCommand> {
        match self.word(1, "category action")? {
            "add" => {
                self.expect_len(4)?;
                Ok(ScriptCommand::AddCategory {
                    name: self.word(2, "name")?.to_string(),
                    tax_rate_percent: parse_percent("tax_rate", self.word(3, "tax rate")?)?,
                })
            }
            other => Err(self.syntax(format!("unknown category action '{}'", other))),
        }
    }

    fn item(&self) -> CliResult<ScriptCommand> {
        let action = self.word(1, "item action")?;
        match action {
            "add" => {
                let name = self.word(2, "item name")?.to_string();
                let price = parse_money(self.word(3, "price")?)?;

                let mut rest = 4;
                let mut quantity = None;
                if let Some(word) = self.words.get(4).filter(|w| !w.contains('=')) {
                    quantity = Some(parse_quantity(word)?);
                    rest = 5;
                }

                let mut fields = self.options(rest)?;
                if fields.name.is_some() || fields.unit_price.is_some() {
                    return Err(self.syntax("name and price are positional for 'item add'"));
                }
                if quantity.is_some() && fields.quantity.is_some() {
                    return Err(self.syntax("quantity given twice"));
                }
                fields.quantity = quantity.or(fields.quantity);
                Ok(ScriptCommand::AddItem {
                    name,
                    unit_price: price,
                    fields,
                })
            }
            "edit" => {
                let position = self.position()?;
                let fields = self.options(3)?;
                if fields == ItemFields::default() {
                    return Err(self.syntax("nothing to change"));
                }
                Ok(ScriptCommand::EditItem { position, fields })
            }
            "remove" | "exclude" | "include" => {
                self.expect_len(3)?;
                let position = self.position()?;
                Ok(match action {
                    "remove" => ScriptCommand::RemoveItem(position),
                    "exclude" => ScriptCommand::ExcludeItem(position),
                    _ => ScriptCommand::IncludeItem(position),
                })
            }
            other => Err(self.syntax(format!("unknown item action '{}'", other))),
        }
    }

    fn position(&self) -> CliResult<usize> {
        let word = self.word(2, "item number")?;
        match word.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(self.syntax(format!("item number must be 1 or more, got '{}'", word))),
        }
    }

    /// `key=value` words from `start` on.
    fn options(&self, start: usize) -> CliResult<ItemFields> {
        let mut fields = ItemFields::default();
        for word in self.words.iter().skip(start) {
            let (key, value) = word
                .split_once('=')
                .ok_or_else(|| self.syntax(format!("expected key=value, got '{}'", word)))?;
            match key.to_ascii_lowercase().as_str() {
                "name" => fields.name = Some(value.to_string()),
                "price" => fields.unit_price = Some(parse_money(value)?),
                "qty" | "quantity" => fields.quantity = Some(parse_quantity(value)?),
                "category" => fields.category = Some(value.to_string()),
                "for" => fields.participants = Some(split_names(value)),
                "split" => {
                    for pair in value.split(',').filter(|p| !p.trim().is_empty()) {
                        let (name, qty) = pair
                            .rsplit_once(':')
                            .ok_or_else(|| self.syntax(format!("expected NAME:QTY, got '{}'", pair)))?;
                        let qty = qty.trim().parse::<f64>().map_err(|_| {
                            invalid(ValidationError::InvalidFormat {
                                field: "split".to_string(),
                                reason: format!("'{}' is not a quantity", qty.trim()),
                            })
                        })?;
                        fields.split.push((name.trim().to_string(), qty));
                    }
                }
                other => return Err(self.syntax(format!("unknown option '{}'", other))),
            }
        }
        Ok(fields)
    }
}

fn invalid(err: ValidationError) -> CliError {
    CliError::Core(CoreError::Validation(err))
}

fn parse_money(word: &str) -> CliResult<Money> {
    word.parse::<Money>().map_err(invalid)
}

fn parse_quantity(word: &str) -> CliResult<i64> {
    word.trim().parse::<i64>().map_err(|_| {
        invalid(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("'{}' is not a whole number", word.trim()),
        })
    })
}

/// `"10"`, `"10%"` and `"8.25"` are all percentages.
fn parse_percent(field: &str, word: &str) -> CliResult<f64> {
    let trimmed = word.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);
    digits.trim().parse::<f64>().map_err(|_| {
        invalid(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a percentage", trimmed),
        })
    })
}

/// Comma-separated names, blanks dropped.
pub(crate) fn split_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn parse(line: &str) -> ScriptCommand {
        ScriptCommand::parse(1, line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(ScriptCommand::parse(1, "   ").unwrap(), None);
        assert_eq!(ScriptCommand::parse(1, "# setup").unwrap(), None);
    }

    #[test]
    fn test_participant_commands() {
        assert_eq!(parse("participant add Alice"), ScriptCommand::AddParticipant("Alice".into()));
        assert_eq!(
            parse("participant rename Alice \"Alice B\""),
            ScriptCommand::RenameParticipant {
                from: "Alice".into(),
                to: "Alice B".into()
            }
        );
        assert_eq!(parse("participant remove Bob"), ScriptCommand::RemoveParticipant("Bob".into()));
    }

    #[test]
    fn test_item_add_full() {
        let cmd = parse("item add Soda 2.50 4 category=Drinks for=Alice,Bob,Carol split=Alice:1");
        let ScriptCommand::AddItem {
            name,
            unit_price,
            fields,
        } = cmd
        else {
            panic!("expected AddItem");
        };
        assert_eq!(name, "Soda");
        assert_eq!(unit_price, Money::from_cents(250));
        assert_eq!(fields.quantity, Some(4));
        assert_eq!(fields.category.as_deref(), Some("Drinks"));
        assert_eq!(
            fields.participants,
            Some(vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()])
        );
        assert_eq!(fields.split, vec![("Alice".to_string(), 1.0)]);
    }

    #[test]
    fn test_item_add_defaults() {
        let ScriptCommand::AddItem { fields, .. } = parse("item add Bread $3") else {
            panic!("expected AddItem");
        };
        assert_eq!(fields.quantity, None);
        assert_eq!(fields.participants, None);
    }

    #[test]
    fn test_item_edit_and_positions() {
        assert_eq!(
            parse("item edit 2 qty=3"),
            ScriptCommand::EditItem {
                position: 2,
                fields: ItemFields {
                    quantity: Some(3),
                    ..ItemFields::default()
                }
            }
        );
        assert_eq!(parse("item exclude 1"), ScriptCommand::ExcludeItem(1));

        let err = ScriptCommand::parse(5, "item remove 0").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScriptError);
        assert!(ScriptCommand::parse(5, "item edit 1").is_err());
    }

    #[test]
    fn test_calc_and_mode() {
        assert_eq!(parse("calc"), ScriptCommand::Calc { discount_percent: None });
        assert_eq!(parse("calc 10%"), ScriptCommand::Calc { discount_percent: Some(10.0) });
        assert_eq!(parse("mode uniform"), ScriptCommand::SetMode(DiscountMode::Uniform));
    }

    #[test]
    fn test_import_names() {
        assert_eq!(
            parse("import receipt.txt Alice,Bob"),
            ScriptCommand::Import {
                path: PathBuf::from("receipt.txt"),
                participants: Some(vec!["Alice".into(), "Bob".into()])
            }
        );
    }

    #[test]
    fn test_error_kinds() {
        let err = ScriptCommand::parse(3, "frobnicate").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScriptError);
        assert_eq!(err.to_string(), "Line 3: unknown command 'frobnicate'");

        let err = ScriptCommand::parse(3, "item add Soda abc").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);

        let err = ScriptCommand::parse(3, "undo now").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ScriptError);
    }
}
