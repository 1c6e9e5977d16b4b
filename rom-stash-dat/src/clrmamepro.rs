//! ClrMamePro DAT parser.
//!
//! The format is a whitespace-separated token stream: barewords, quoted
//! strings with `\"` escapes, and parens that open and close groups.
//! The single `clrmamepro ( ... )` group carries the header; `game` and
//! `resource` groups carry the entries.

use rom_stash_core::{ChecksumKind, ChecksumSet, Rom, RomPath};

use crate::error::DatError;
use crate::model::{normalize_entry_name, Dat, DatMeta, Game};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Open,
    Close,
}

/// Split DAT text into words, quoted strings and group parens.
fn tokenize(text: &str) -> Result<Vec<Token>, DatError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            '"' => {
                chars.next();
                let mut word = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some('"') => word.push('"'),
                            Some('\\') => word.push('\\'),
                            Some(other) => {
                                word.push('\\');
                                word.push(other);
                            }
                            None => return Err(DatError::content("unterminated escape")),
                        },
                        Some('"') => break,
                        Some(other) => word.push(other),
                        None => return Err(DatError::content("unterminated quoted string")),
                    }
                }
                tokens.push(Token::Word(word));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn expect_open(&mut self, context: &str) -> Result<(), DatError> {
        match self.next() {
            Some(Token::Open) => Ok(()),
            other => Err(DatError::content(format!(
                "expected '(' after {context}, got {other:?}"
            ))),
        }
    }

    /// The scalar value following a key.
    fn scalar(&mut self, key: &str) -> Result<String, DatError> {
        match self.next() {
            Some(Token::Word(word)) => Ok(word),
            other => Err(DatError::content(format!(
                "expected value after {key:?}, got {other:?}"
            ))),
        }
    }

    /// Skip a balanced group whose `(` has just been consumed.
    fn skip_group(&mut self) -> Result<(), DatError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.next() {
                Some(Token::Open) => depth += 1,
                Some(Token::Close) => depth -= 1,
                Some(Token::Word(_)) => {}
                None => return Err(DatError::content("unbalanced parentheses")),
            }
        }
        Ok(())
    }

    /// Consume one value: scalar word, or a whole group for unknown keys.
    fn skip_value(&mut self, key: &str) -> Result<(), DatError> {
        match self.next() {
            Some(Token::Word(_)) => Ok(()),
            Some(Token::Open) => self.skip_group(),
            other => Err(DatError::content(format!(
                "expected value after {key:?}, got {other:?}"
            ))),
        }
    }
}

/// Probe-parse ClrMamePro text.
///
/// `Ok(None)` when the mandatory `clrmamepro` group is absent (the text is
/// some other format); content errors once the dialect is established.
pub fn parse(text: &str) -> Result<Option<Dat>, DatError> {
    if !text.contains("clrmamepro") {
        return Ok(None);
    }
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let mut meta: Option<DatMeta> = None;
    let mut games = Vec::new();

    while let Some(token) = parser.next() {
        let block = match token {
            Token::Word(word) => word,
            other => {
                return Err(DatError::content(format!(
                    "expected block name at top level, got {other:?}"
                )))
            }
        };
        parser.expect_open(&block)?;
        match block.as_str() {
            "clrmamepro" => {
                if meta.is_some() {
                    return Err(DatError::content("multiple clrmamepro blocks"));
                }
                meta = Some(parse_meta(&mut parser)?);
            }
            // Resources hold BIOS sets; they carry ROMs like any game.
            "game" | "resource" => games.push(parse_game(&mut parser)?),
            _ => parser.skip_group()?,
        }
    }

    let meta = meta.ok_or_else(|| DatError::content("missing clrmamepro block"))?;
    Ok(Some(Dat::new(meta, games)?))
}

fn parse_meta(parser: &mut Parser) -> Result<DatMeta, DatError> {
    let mut meta = DatMeta::default();
    loop {
        match parser.next() {
            Some(Token::Close) => break,
            Some(Token::Word(key)) => match key.as_str() {
                "name" => meta.name = parser.scalar(&key)?,
                "description" => meta.description = parser.scalar(&key)?,
                "version" => meta.version = parser.scalar(&key)?,
                "date" => meta.date = parser.scalar(&key)?,
                "author" => meta.author = parser.scalar(&key)?,
                "url" | "homepage" => meta.url = parser.scalar(&key)?,
                _ => parser.skip_value(&key)?,
            },
            other => {
                return Err(DatError::content(format!(
                    "unexpected token in clrmamepro block: {other:?}"
                )))
            }
        }
    }
    Ok(meta)
}

fn parse_game(parser: &mut Parser) -> Result<Game, DatError> {
    let mut game = Game::new("");
    loop {
        match parser.next() {
            Some(Token::Close) => break,
            Some(Token::Word(key)) => match key.as_str() {
                "name" => game.name = parser.scalar(&key)?,
                "cloneof" => game.cloneof = Some(parser.scalar(&key)?),
                "description" | "year" | "manufacturer" | "romof" | "sampleof" | "sample" => {
                    parser.scalar(&key)?;
                }
                "rom" | "disk" => {
                    parser.expect_open(&key)?;
                    game.roms.push(parse_rom(parser)?);
                }
                _ => parser.skip_value(&key)?,
            },
            other => {
                return Err(DatError::content(format!(
                    "unexpected token in game block: {other:?}"
                )))
            }
        }
    }
    if game.name.is_empty() {
        return Err(DatError::content("game without a name"));
    }
    Ok(game)
}

fn parse_rom(parser: &mut Parser) -> Result<Rom, DatError> {
    let mut name = String::new();
    let mut size: Option<u64> = None;
    let mut checksums = ChecksumSet::new();

    loop {
        match parser.next() {
            Some(Token::Close) => break,
            Some(Token::Word(key)) => match key.as_str() {
                "name" => name = parser.scalar(&key)?,
                "size" => {
                    let value = parser.scalar(&key)?;
                    size = Some(value.parse().map_err(|_| {
                        DatError::content(format!("invalid rom size {value:?}"))
                    })?);
                }
                "crc" => {
                    let value = parser.scalar(&key)?;
                    checksums.insert_hex(ChecksumKind::Crc32, &value.to_lowercase())?;
                }
                "md5" => {
                    let value = parser.scalar(&key)?;
                    checksums.insert_hex(ChecksumKind::Md5, &value.to_lowercase())?;
                }
                "sha1" => {
                    let value = parser.scalar(&key)?;
                    checksums.insert_hex(ChecksumKind::Sha1, &value.to_lowercase())?;
                }
                "merge" | "flags" => {
                    parser.scalar(&key)?;
                }
                _ => parser.skip_value(&key)?,
            },
            other => {
                return Err(DatError::content(format!(
                    "unexpected token in rom block: {other:?}"
                )))
            }
        }
    }

    if name.is_empty() {
        return Err(DatError::content("rom without a name"));
    }
    let path = RomPath::from_entry_name(normalize_entry_name(&name));
    Ok(Rom::new(path, size, None, checksums))
}

#[cfg(test)]
#[path = "tests/clrmamepro_tests.rs"]
mod tests;
