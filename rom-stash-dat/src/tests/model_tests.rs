use super::*;
use rom_stash_core::{ChecksumSet, RomPath};

fn rom(name: &str, sha1_fill: char, crc: &str) -> Rom {
    let mut checksums = ChecksumSet::new();
    checksums
        .insert_hex(ChecksumKind::Sha1, &sha1_fill.to_string().repeat(40))
        .unwrap();
    checksums.insert_hex(ChecksumKind::Crc32, crc).unwrap();
    Rom::new(RomPath::from_entry_name(name), Some(64), None, checksums)
}

fn sample_dat() -> Dat {
    let mut g1 = Game::new("Game One");
    g1.roms.push(rom("one.bin", 'a', "11111111"));
    let mut g2 = Game::new("Game Two");
    g2.roms.push(rom("two.bin", 'b', "22222222"));
    // Shared content under a different catalog name.
    g2.roms.push(rom("one-again.bin", 'a', "11111111"));
    Dat::new(DatMeta::default(), vec![g1, g2]).unwrap()
}

#[test]
fn duplicate_names_rejected() {
    let games = vec![Game::new("Dup"), Game::new("Dup")];
    assert!(Dat::new(DatMeta::default(), games).is_err());
}

#[test]
fn matches_returns_every_containing_position() {
    let dat = sample_dat();
    let probe = rom("anything.bin", 'a', "11111111");

    let matches = dat.matches(&probe);
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].0.name, "Game One");
    assert_eq!(matches[0].1.name(), "one.bin");
    assert_eq!(matches[1].0.name, "Game Two");
    assert_eq!(matches[1].1.name(), "one-again.bin");
}

#[test]
fn matches_prefers_strong_checksums() {
    let dat = sample_dat();
    // SHA-1 of game two, CRC of game one: the stronger kind decides.
    let mut checksums = ChecksumSet::new();
    checksums
        .insert_hex(ChecksumKind::Sha1, &"b".repeat(40))
        .unwrap();
    checksums.insert_hex(ChecksumKind::Crc32, "11111111").unwrap();
    let probe = Rom::new(RomPath::from_entry_name("p.bin"), Some(64), None, checksums);

    let matches = dat.matches(&probe);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].1.name(), "two.bin");
}

#[test]
fn no_match_for_unknown_content() {
    let dat = sample_dat();
    let probe = rom("mystery.bin", 'f', "ffffffff");
    assert!(dat.matches(&probe).is_empty());
}

#[test]
fn games_containing_deduplicates() {
    let dat = sample_dat();
    let probe = rom("x.bin", 'a', "11111111");
    let games = dat.games_containing(&probe);
    assert_eq!(games.len(), 2);

    let probe_two = rom("y.bin", 'b', "22222222");
    let games = dat.games_containing(&probe_two);
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].name, "Game Two");
}

#[test]
fn entry_name_normalization() {
    assert_eq!(normalize_entry_name("plain.bin"), "plain.bin");
    let expected = format!("a{0}b{0}c.bin", std::path::MAIN_SEPARATOR);
    assert_eq!(normalize_entry_name("a\\b\\c.bin"), expected);
}

#[test]
fn lookup_by_game_name() {
    let dat = sample_dat();
    assert!(dat.game("Game One").is_some());
    assert!(dat.game("Nope").is_none());
}
