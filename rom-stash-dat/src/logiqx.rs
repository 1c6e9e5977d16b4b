//! Logiqx XML DAT parser.
//!
//! The dialect is identified by its internal DTD id; anything without it
//! is handed back to the dispatcher as "not this format".

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use rom_stash_core::{ChecksumKind, ChecksumSet, Rom, RomPath};

use crate::error::DatError;
use crate::model::{normalize_entry_name, Dat, DatMeta, Game, Release};

const LOGIQX_DTD: &str = "-//Logiqx//DTD ROM Management Datafile//EN";

/// Probe-parse Logiqx XML.
///
/// `Ok(None)` when the document does not declare the Logiqx DTD;
/// content errors once the dialect is established.
pub fn parse(bytes: &[u8]) -> Result<Option<Dat>, DatError> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();

    // The DTD id must appear before the first element.
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::DocType(ref doctype)) => {
                let text = String::from_utf8_lossy(doctype);
                if text.contains(LOGIQX_DTD) {
                    break;
                }
                return Ok(None);
            }
            Ok(Event::Start(_)) | Ok(Event::Empty(_)) | Ok(Event::Eof) => return Ok(None),
            Ok(_) => {}
            // Not XML at all: some other format.
            Err(_) => return Ok(None),
        }
        buf.clear();
    }
    buf.clear();

    let mut meta = DatMeta::default();
    let mut games = Vec::new();
    let mut in_header = false;
    let mut current_tag = String::new();
    let mut current_game: Option<Game> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"header" => in_header = true,
                b"game" => current_game = Some(game_from_attributes(e)?),
                b"release" => {
                    if let Some(game) = current_game.as_mut() {
                        game.releases.push(release_from_attributes(e)?);
                    }
                }
                b"rom" => {
                    if let Some(game) = current_game.as_mut() {
                        game.roms.push(rom_from_attributes(e)?);
                    }
                }
                tag => current_tag = String::from_utf8_lossy(tag).into_owned(),
            },
            Event::Empty(ref e) => match e.name().as_ref() {
                b"game" => {
                    games.push(game_from_attributes(e)?);
                }
                b"release" => {
                    if let Some(game) = current_game.as_mut() {
                        game.releases.push(release_from_attributes(e)?);
                    }
                }
                b"rom" => {
                    if let Some(game) = current_game.as_mut() {
                        game.roms.push(rom_from_attributes(e)?);
                    }
                }
                _ => {}
            },
            Event::Text(ref e) => {
                if in_header {
                    let text = e.unescape()?.into_owned();
                    match current_tag.as_str() {
                        "name" => meta.name = text,
                        "description" => meta.description = text,
                        "version" => meta.version = text,
                        "date" => meta.date = text,
                        "author" => meta.author = text,
                        "url" | "homepage" => meta.url = text,
                        _ => {}
                    }
                }
            }
            Event::End(ref e) => match e.name().as_ref() {
                b"header" => in_header = false,
                b"game" => {
                    if let Some(game) = current_game.take() {
                        games.push(game);
                    }
                }
                _ => current_tag.clear(),
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Some(Dat::new(meta, games)?))
}

fn attribute_value(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, DatError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn game_from_attributes(e: &BytesStart<'_>) -> Result<Game, DatError> {
    let name = attribute_value(e, b"name")?
        .ok_or_else(|| DatError::content("game without a name attribute"))?;
    let mut game = Game::new(name);
    game.cloneof = attribute_value(e, b"cloneof")?;
    Ok(game)
}

fn release_from_attributes(e: &BytesStart<'_>) -> Result<Release, DatError> {
    let name = attribute_value(e, b"name")?
        .ok_or_else(|| DatError::content("release without a name attribute"))?;
    Ok(Release {
        name,
        region: attribute_value(e, b"region")?,
    })
}

fn rom_from_attributes(e: &BytesStart<'_>) -> Result<Rom, DatError> {
    let name = attribute_value(e, b"name")?
        .ok_or_else(|| DatError::content("rom without a name attribute"))?;

    let size = match attribute_value(e, b"size")? {
        Some(value) => Some(
            value
                .parse::<u64>()
                .map_err(|_| DatError::content(format!("invalid rom size {value:?}")))?,
        ),
        None => None,
    };

    let mut checksums = ChecksumSet::new();
    for (key, kind) in [
        (b"crc".as_slice(), ChecksumKind::Crc32),
        (b"md5".as_slice(), ChecksumKind::Md5),
        (b"sha1".as_slice(), ChecksumKind::Sha1),
        (b"sha256".as_slice(), ChecksumKind::Sha256),
    ] {
        if let Some(value) = attribute_value(e, key)? {
            checksums.insert_hex(kind, &value.to_lowercase())?;
        }
    }

    let path = RomPath::from_entry_name(normalize_entry_name(&name));
    Ok(Rom::new(path, size, None, checksums))
}

#[cfg(test)]
#[path = "tests/logiqx_tests.rs"]
mod tests;
