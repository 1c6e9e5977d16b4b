use super::*;

const SAMPLE: &str = r#"
clrmamepro (
	name "Nintendo - Nintendo Entertainment System"
	description "Nintendo - Nintendo Entertainment System (20210714)"
	version 20210714-000000
	author "rom-stash tests"
)

game (
	name "Super Mario Bros. (World)"
	description "Super Mario Bros. (World)"
	year 1985
	manufacturer Nintendo
	rom ( name "Super Mario Bros. (World).nes" size 40960 crc 3337EC46 sha1 ea343f4e445a9050d4b4fbac2c77d0693b1d0922 )
)

game (
	name "Duck Hunt (World)"
	cloneof "Super Mario Bros. (World)"
	rom ( name "Duck Hunt (World).nes" size 24576 crc 07F4AA5B )
)
"#;

#[test]
fn parses_header_and_games() {
    let dat = parse(SAMPLE).unwrap().unwrap();
    assert_eq!(dat.meta().name, "Nintendo - Nintendo Entertainment System");
    assert_eq!(dat.meta().version, "20210714-000000");
    assert_eq!(dat.meta().author, "rom-stash tests");
    assert_eq!(dat.games().len(), 2);

    let smb = &dat.games()[0];
    assert_eq!(smb.name, "Super Mario Bros. (World)");
    assert_eq!(smb.roms.len(), 1);
    assert_eq!(smb.roms[0].name(), "Super Mario Bros. (World).nes");
    assert_eq!(smb.roms[0].size(), Some(40960));
    assert_eq!(
        smb.roms[0].checksums().hex(ChecksumKind::Crc32).as_deref(),
        Some("3337ec46")
    );
    assert_eq!(
        smb.roms[0].checksums().hex(ChecksumKind::Sha1).as_deref(),
        Some("ea343f4e445a9050d4b4fbac2c77d0693b1d0922")
    );
}

#[test]
fn cloneof_is_kept() {
    let dat = parse(SAMPLE).unwrap().unwrap();
    assert_eq!(
        dat.games()[1].cloneof.as_deref(),
        Some("Super Mario Bros. (World)")
    );
}

#[test]
fn missing_clrmamepro_block_is_not_this_format() {
    assert!(parse("game ( name \"X\" )").unwrap().is_none());
    assert!(parse("<?xml version=\"1.0\"?><datafile/>").unwrap().is_none());
}

#[test]
fn resource_blocks_count_as_games() {
    let text = r#"
clrmamepro ( name "Test" )
resource (
	name "bios"
	rom ( name "bios.rom" size 16 crc deadbeef )
)
"#;
    let dat = parse(text).unwrap().unwrap();
    assert_eq!(dat.games().len(), 1);
    assert_eq!(dat.games()[0].name, "bios");
}

#[test]
fn duplicate_game_names_are_a_content_error() {
    let text = r#"
clrmamepro ( name "Test" )
game ( name "Same" rom ( name a crc 11111111 ) )
game ( name "Same" rom ( name b crc 22222222 ) )
"#;
    assert!(matches!(parse(text), Err(DatError::Content(_))));
}

#[test]
fn bad_checksum_width_is_a_content_error() {
    let text = r#"
clrmamepro ( name "Test" )
game ( name "X" rom ( name x.bin crc 123 ) )
"#;
    assert!(parse(text).is_err());
}

#[test]
fn quoted_strings_unescape() {
    let text = r#"
clrmamepro ( name "He said \"hi\"" )
game ( name "G" rom ( name "a.bin" crc 11111111 ) )
"#;
    let dat = parse(text).unwrap().unwrap();
    assert_eq!(dat.meta().name, "He said \"hi\"");
}

#[test]
fn backslash_names_join_with_platform_separator() {
    let text = r#"
clrmamepro ( name "Test" )
game ( name "G" rom ( name "sub\\a.bin" crc 11111111 ) )
"#;
    let dat = parse(text).unwrap().unwrap();
    let expected = format!("sub{}a.bin", std::path::MAIN_SEPARATOR);
    assert_eq!(dat.games()[0].roms[0].name(), expected);
}

#[test]
fn unknown_keys_are_skipped() {
    let text = r#"
clrmamepro ( name "Test" oddity "ignored" )
game (
	name "G"
	novelty ( nested ( deep "x" ) )
	rom ( name a.bin size 1 crc 11111111 exotic true )
)
"#;
    let dat = parse(text).unwrap().unwrap();
    assert_eq!(dat.games()[0].roms[0].name(), "a.bin");
}

#[test]
fn disk_entries_are_roms_too() {
    let text = r#"
clrmamepro ( name "Test" )
game (
	name "G"
	disk ( name g.chd sha1 da39a3ee5e6b4b0d3255bfef95601890afd80709 )
)
"#;
    let dat = parse(text).unwrap().unwrap();
    assert_eq!(dat.games()[0].roms.len(), 1);
    assert_eq!(dat.games()[0].roms[0].size(), None);
}
