//! Filter expression parsing.
//!
//! Grammar, one or more top-level expressions ANDed together:
//!
//! ```text
//! filter := expr ( [","] expr )*
//! expr   := "(" item ( "," item )* ")"
//! item   := expr | list | atom
//! list   := "[" atom ( "," atom )* "]"
//! atom   := 'quoted text' | raw text up to "," ")" or "]"
//! ```
//!
//! `(field,value)` is an equality test, `(field,op,value)` names the
//! operator, `(and,expr,...)` / `(or,expr,...)` combine. Atoms read as
//! numbers, `true`, `false` or `null` when they look like one; quoted
//! atoms are always strings, as is every atom compared against `id` or
//! `type`.

use serde_json::{Number, Value};

use crate::types::{ApiError, FilterOperator, Predicate};

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Expr(Vec<Item>),
    List(Vec<Atom>),
    Atom(Atom),
}

#[derive(Debug, Clone, PartialEq)]
struct Atom {
    text: String,
    quoted: bool,
}

impl Atom {
    fn to_string_value(&self) -> Value {
        Value::String(self.text.clone())
    }

    fn to_value(&self) -> Value {
        if self.quoted {
            return Value::String(self.text.clone());
        }
        match self.text.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            "null" => Value::Null,
            text => text
                .parse::<i64>()
                .map(Value::from)
                .ok()
                .or_else(|| {
                    text.parse::<f64>()
                        .ok()
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                })
                .unwrap_or_else(|| Value::String(text.to_string())),
        }
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), String> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(c) => Err(format!("expected '{}' at position {}, found '{}'", wanted, self.pos - c.len_utf8(), c)),
            None => Err(format!("expected '{}' but the filter ended", wanted)),
        }
    }

    fn parse_expr(&mut self) -> Result<Vec<Item>, String> {
        self.expect('(')?;
        let mut items = vec![self.parse_item()?];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    items.push(self.parse_item()?);
                }
                Some(')') => {
                    self.bump();
                    return Ok(items);
                }
                Some(c) => return Err(format!("unexpected '{}' at position {}", c, self.pos)),
                None => return Err("unclosed '('".to_string()),
            }
        }
    }

    fn parse_item(&mut self) -> Result<Item, String> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => Ok(Item::Expr(self.parse_expr()?)),
            Some('[') => {
                self.bump();
                let mut atoms = vec![self.parse_atom()?];
                loop {
                    self.skip_whitespace();
                    match self.bump() {
                        Some(',') => atoms.push(self.parse_atom()?),
                        Some(']') => return Ok(Item::List(atoms)),
                        Some(c) => return Err(format!("unexpected '{}' in list", c)),
                        None => return Err("unclosed '['".to_string()),
                    }
                }
            }
            _ => Ok(Item::Atom(self.parse_atom()?)),
        }
    }

    fn parse_atom(&mut self) -> Result<Atom, String> {
        self.skip_whitespace();
        if self.peek() == Some('\'') {
            self.bump();
            let start = self.pos;
            while let Some(c) = self.bump() {
                if c == '\'' {
                    return Ok(Atom {
                        text: self.input[start..self.pos - 1].to_string(),
                        quoted: true,
                    });
                }
            }
            return Err("unterminated quoted string".to_string());
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, ',' | ')' | ']' | '(' | '[') {
                break;
            }
            self.bump();
        }
        let text = self.input[start..self.pos].trim();
        if text.is_empty() {
            return Err(format!("missing value at position {}", start));
        }
        Ok(Atom {
            text: text.to_string(),
            quoted: false,
        })
    }
}

/// Parse the raw `filter` parameter
pub fn parse_filter(raw: &str) -> Result<Predicate, ApiError> {
    let mut parser = Parser { input: raw, pos: 0 };
    let mut predicates = Vec::new();

    loop {
        parser.skip_whitespace();
        match parser.peek() {
            None => break,
            Some(',') if !predicates.is_empty() => {
                parser.bump();
            }
            Some(_) => {
                let items = parser.parse_expr().map_err(|e| invalid_filter(raw, &e))?;
                predicates.push(to_predicate(items).map_err(|e| invalid_filter(raw, &e))?);
            }
        }
    }

    match predicates.len() {
        0 => Err(invalid_filter(raw, "the filter is empty")),
        1 => Ok(predicates.remove(0)),
        _ => Ok(Predicate::And(predicates)),
    }
}

fn to_predicate(items: Vec<Item>) -> Result<Predicate, String> {
    let mut items = items.into_iter();
    let head = match items.next() {
        Some(Item::Atom(atom)) if !atom.quoted => atom.text,
        _ => return Err("every expression must start with a field name or and/or".to_string()),
    };
    let rest: Vec<Item> = items.collect();

    if head == "and" || head == "or" {
        if rest.is_empty() {
            return Err(format!("'{}' needs at least one expression", head));
        }
        let operands = rest
            .into_iter()
            .map(|item| match item {
                Item::Expr(inner) => to_predicate(inner),
                _ => Err(format!("'{}' only combines parenthesized expressions", head)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(if head == "and" {
            Predicate::And(operands)
        } else {
            Predicate::Or(operands)
        });
    }

    let (operator, value) = match rest.as_slice() {
        [value] => (FilterOperator::Eq, value),
        [Item::Atom(op), value] if !op.quoted => {
            let operator = FilterOperator::parse(&op.text)
                .ok_or_else(|| format!("unknown operator '{}'", op.text))?;
            (operator, value)
        }
        _ => return Err(format!("wrong number of arguments for field '{}'", head)),
    };

    // identity fields are always strings; keep `007` and `1e3` verbatim
    let convert: fn(&Atom) -> Value = if head == "id" || head == "type" {
        Atom::to_string_value
    } else {
        Atom::to_value
    };

    let value = match (value, operator.takes_list()) {
        (Item::List(atoms), true) => Value::Array(atoms.iter().map(convert).collect()),
        (Item::Atom(atom), false) => convert(atom),
        (_, true) => return Err(format!("'{}' needs a list value", operator.as_str())),
        (_, false) => return Err(format!("'{}' needs a single value", operator.as_str())),
    };

    if operator.is_ordering() && !(value.is_number() || value.is_string()) {
        return Err(format!("'{}' needs a number or string", operator.as_str()));
    }

    Ok(Predicate::constraint(head, operator, value))
}

fn invalid_filter(raw: &str, problem: &str) -> ApiError {
    ApiError::bad_request("Invalid filter")
        .with_detail(format!("Could not parse filter \"{}\": {}.", raw, problem))
        .with_parameter("filter")
}
