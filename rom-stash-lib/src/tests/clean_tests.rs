use super::*;
use rom_stash_core::digest::digest_reader;
use rom_stash_core::{Rom, RomPath};
use rom_stash_dat::{DatMeta, Game};
use std::io::Cursor;
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

fn dat_with(contents: &[u8]) -> Dat {
    let mut game = Game::new("G");
    game.roms.push(catalog_rom("known.bin", contents));
    Dat::new(DatMeta::default(), vec![game]).unwrap()
}

fn vault_in(dir: &Path, files: &[(&str, &[u8])]) -> Vault {
    for (name, data) in files {
        std::fs::write(dir.join(name), data).unwrap();
    }
    let mut vault = Vault::new();
    vault.add_from_dir(dir, None).unwrap();
    vault
}

#[test]
fn extras_are_deleted_and_reported() {
    let tmp = TempDir::new().unwrap();
    let mut vault = vault_in(
        tmp.path(),
        &[("known.bin", b"known"), ("extra.bin", b"extra")],
    );
    let dat = dat_with(b"known");

    let mut reported = Vec::new();
    let summary = clean(&mut vault, &dat, None, &mut |p| {
        reported.push(p.to_string())
    })
    .unwrap();

    assert_eq!(summary.deleted.len(), 1);
    assert_eq!(reported, summary.deleted);
    assert!(tmp.path().join("known.bin").exists());
    assert!(!tmp.path().join("extra.bin").exists());
}

#[test]
fn trash_dir_receives_a_copy_first() {
    let tmp = TempDir::new().unwrap();
    let roms = tmp.path().join("roms");
    std::fs::create_dir(&roms).unwrap();
    let mut vault = vault_in(&roms, &[("known.bin", b"known"), ("extra.bin", b"extra")]);
    let dat = dat_with(b"known");

    let trash = tmp.path().join("trash");
    let summary = clean(&mut vault, &dat, Some(&trash), &mut |_| {}).unwrap();

    assert_eq!(summary.deleted.len(), 1);
    assert!(!roms.join("extra.bin").exists());
    assert_eq!(std::fs::read(trash.join("extra.bin")).unwrap(), b"extra");
}

#[test]
fn clean_vault_paths_turn_virtual() {
    let tmp = TempDir::new().unwrap();
    let mut vault = vault_in(tmp.path(), &[("extra.bin", b"extra")]);
    let dat = dat_with(b"known");

    clean(&mut vault, &dat, None, &mut |_| {}).unwrap();
    assert!(vault.roms()[0].path().is_virtual());
}

#[test]
fn nothing_to_clean_is_a_no_op() {
    let tmp = TempDir::new().unwrap();
    let mut vault = vault_in(tmp.path(), &[("known.bin", b"known")]);
    let dat = dat_with(b"known");

    let summary = clean(&mut vault, &dat, None, &mut |_| {
        panic!("nothing should be reported")
    })
    .unwrap();
    assert!(summary.deleted.is_empty());
    assert!(summary.errors.is_empty());
}
