use super::*;
use rom_stash_core::digest::digest_reader;
use rom_stash_core::RomPath;
use rom_stash_dat::{DatMeta, Game};
use rom_stash_core::Rom;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;

fn catalog_rom(name: &str, contents: &[u8]) -> Rom {
    let digest = digest_reader(Cursor::new(contents.to_vec())).unwrap();
    Rom::new(
        RomPath::from_entry_name(name),
        Some(digest.size),
        None,
        digest.checksums,
    )
}

fn dat_with(roms: Vec<Rom>) -> Dat {
    let mut game = Game::new("G");
    game.roms = roms;
    Dat::new(DatMeta::default(), vec![game]).unwrap()
}

fn vault_in(dir: &Path, files: &[(&str, &[u8])]) -> Vault {
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
    let mut vault = Vault::new();
    vault.add_from_dir(dir, None).unwrap();
    vault
}

#[test]
fn renames_to_the_cataloged_name() {
    let dir = TempDir::new().unwrap();
    let mut vault = vault_in(dir.path(), &[("misnamed.bin", b"content")]);
    let dat = dat_with(vec![catalog_rom("proper.bin", b"content")]);

    let summary = rename_to_catalog(&mut vault, &dat, false);
    assert_eq!(summary.renamed, 1);
    assert!(summary.errors.is_empty());
    assert!(dir.path().join("proper.bin").exists());
    assert!(!dir.path().join("misnamed.bin").exists());
    assert_eq!(vault.roms()[0].name(), "proper.bin");
}

#[test]
fn correct_names_are_left_alone() {
    let dir = TempDir::new().unwrap();
    let mut vault = vault_in(dir.path(), &[("proper.bin", b"content")]);
    let dat = dat_with(vec![catalog_rom("proper.bin", b"content")]);

    let summary = rename_to_catalog(&mut vault, &dat, false);
    assert_eq!(summary.renamed, 0);
    assert_eq!(summary.already_correct, 1);
    assert!(dir.path().join("proper.bin").exists());
}

#[test]
fn unknown_content_is_skipped_with_a_warning() {
    let dir = TempDir::new().unwrap();
    let mut vault = vault_in(dir.path(), &[("stray.bin", b"unknown")]);
    let dat = dat_with(vec![catalog_rom("proper.bin", b"content")]);

    let summary = rename_to_catalog(&mut vault, &dat, false);
    assert_eq!(summary.unmatched, 1);
    assert!(dir.path().join("stray.bin").exists());
}

#[test]
fn multiple_catalog_names_fill_the_free_slot() {
    let dir = TempDir::new().unwrap();
    // The catalog wants the same content under two names; the vault has
    // one correct copy and one stray copy.
    let mut vault = vault_in(
        dir.path(),
        &[("first.bin", b"shared"), ("stray.bin", b"shared")],
    );
    let dat = dat_with(vec![
        catalog_rom("first.bin", b"shared"),
        catalog_rom("second.bin", b"shared"),
    ]);

    let summary = rename_to_catalog(&mut vault, &dat, false);
    assert_eq!(summary.renamed, 1);
    assert!(dir.path().join("first.bin").exists());
    assert!(dir.path().join("second.bin").exists());
    assert!(!dir.path().join("stray.bin").exists());
}

#[test]
fn redundant_duplicate_is_deleted() {
    let dir = TempDir::new().unwrap();
    let mut vault = vault_in(
        dir.path(),
        &[
            ("first.bin", b"shared"),
            ("second.bin", b"shared"),
            ("stray.bin", b"shared"),
        ],
    );
    let dat = dat_with(vec![
        catalog_rom("first.bin", b"shared"),
        catalog_rom("second.bin", b"shared"),
    ]);

    let summary = rename_to_catalog(&mut vault, &dat, false);
    assert_eq!(summary.deleted, 1);
    assert!(!dir.path().join("stray.bin").exists());
    assert!(dir.path().join("first.bin").exists());
    assert!(dir.path().join("second.bin").exists());
}

#[test]
fn rename_onto_occupied_name_is_an_error_without_force() {
    let dir = TempDir::new().unwrap();
    let mut vault = vault_in(
        dir.path(),
        &[("misnamed.bin", b"content"), ("proper.bin", b"different")],
    );
    let dat = dat_with(vec![catalog_rom("proper.bin", b"content")]);

    let summary = rename_to_catalog(&mut vault, &dat, false);
    assert_eq!(summary.renamed, 0);
    assert!(!summary.errors.is_empty());
    // The differing occupant survives.
    assert_eq!(std::fs::read(dir.path().join("proper.bin")).unwrap(), b"different");
}
