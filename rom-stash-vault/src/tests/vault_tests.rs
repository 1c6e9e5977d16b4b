use super::*;
use rom_stash_core::RomPath;
use tempfile::TempDir;

fn rom(name: &str, sha1_fill: char, crc: &str) -> Rom {
    let mut checksums = ChecksumSet::new();
    checksums
        .insert_hex(ChecksumKind::Sha1, &sha1_fill.to_string().repeat(40))
        .unwrap();
    checksums.insert_hex(ChecksumKind::Crc32, crc).unwrap();
    Rom::new(RomPath::from_entry_name(name), Some(16), None, checksums)
}

fn vault_of(roms: Vec<Rom>) -> Vault {
    roms.into_iter().collect()
}

#[test]
fn preserves_insertion_order() {
    let vault = vault_of(vec![rom("c", 'c', "cccccccc"), rom("a", 'a', "aaaaaaaa")]);
    let names: Vec<_> = vault.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["c", "a"]);
}

#[test]
fn match_walks_strength_order() {
    let vault = vault_of(vec![rom("one", 'a', "11111111"), rom("two", 'b', "22222222")]);

    // SHA-1 of "two" and CRC of "one": SHA-1 wins.
    let mut query = ChecksumSet::new();
    query.insert_hex(ChecksumKind::Sha1, &"b".repeat(40)).unwrap();
    query.insert_hex(ChecksumKind::Crc32, "11111111").unwrap();

    let hits = vault.match_checksums(&query).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name(), "two");
}

#[test]
fn match_falls_through_to_weaker_kinds() {
    let vault = vault_of(vec![rom("one", 'a', "11111111")]);

    let mut query = ChecksumSet::new();
    query.insert_hex(ChecksumKind::Sha1, &"f".repeat(40)).unwrap();
    query.insert_hex(ChecksumKind::Crc32, "11111111").unwrap();

    // The SHA-1 bucket misses but the CRC bucket hits.
    let hits = vault.match_checksums(&query).unwrap();
    assert_eq!(hits[0].name(), "one");
}

#[test]
fn match_returns_none_without_hits() {
    let vault = vault_of(vec![rom("one", 'a', "11111111")]);
    let mut query = ChecksumSet::new();
    query.insert_hex(ChecksumKind::Crc32, "ffffffff").unwrap();
    assert!(vault.match_checksums(&query).is_none());
    assert!(vault.match_checksums(&ChecksumSet::new()).is_none());
}

#[test]
fn duplicate_content_at_distinct_paths_buckets_both() {
    let vault = vault_of(vec![rom("first", 'a', "11111111"), rom("second", 'a', "11111111")]);
    let hits = vault.match_rom(&rom("probe", 'a', "11111111")).unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn duplicate_content_at_same_path_keeps_first() {
    let vault = vault_of(vec![rom("same", 'a', "11111111"), rom("same", 'a', "11111111")]);
    // Both are stored, but the index points at the first only.
    assert_eq!(vault.len(), 2);
    let hits = vault.match_rom(&rom("probe", 'a', "11111111")).unwrap();
    assert_eq!(hits.len(), 1);
}

#[test]
fn set_algebra_laws() {
    let a = vault_of(vec![rom("x", 'a', "11111111"), rom("y", 'b', "22222222")]);
    let b = vault_of(vec![rom("y2", 'b', "22222222")]);

    // a & a == a
    assert_eq!((&a & &a).len(), a.len());
    // a - a == ∅
    assert!((&a - &a).is_empty());
    // (a - b) & b == ∅
    assert!((&(&a - &b) & &b).is_empty());
    // a & b ⊆ a (by match)
    let both = &a & &b;
    assert!(both.iter().all(|r| a.contains(r)));
    assert_eq!(both.len(), 1);
    assert_eq!(both.roms()[0].name(), "y");
}

#[test]
fn set_ops_follow_left_operand_order() {
    let a = vault_of(vec![
        rom("z", 'c', "33333333"),
        rom("m", 'b', "22222222"),
        rom("a", 'a', "11111111"),
    ]);
    let b = vault_of(vec![rom("p", 'a', "11111111"), rom("q", 'c', "33333333")]);

    let names: Vec<_> = (&a & &b).iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["z", "a"]);
}

#[test]
fn copy_to_uses_content_addressed_names() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir(&src).unwrap();
    std::fs::write(src.join("game.bin"), b"payload").unwrap();

    let mut vault = Vault::new();
    vault
        .add_from_file(Path::new("game.bin"), Some(src.as_path()))
        .unwrap();
    let sha1 = vault.roms()[0]
        .checksums()
        .hex(ChecksumKind::Sha1)
        .unwrap();

    let out = dir.path().join("out");
    let summary = vault
        .copy_to(&out, CopyPart::All, &Grouping::Flat, false, false)
        .unwrap();
    assert_eq!(summary.copied, 1);
    assert!(out.join(&sha1).exists());
}

#[test]
fn copy_to_prefix_grouping() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir(&src).unwrap();
    std::fs::write(src.join("game.bin"), b"payload").unwrap();

    let mut vault = Vault::new();
    vault
        .add_from_file(Path::new("game.bin"), Some(src.as_path()))
        .unwrap();
    let sha1 = vault.roms()[0]
        .checksums()
        .hex(ChecksumKind::Sha1)
        .unwrap();

    let out = dir.path().join("out");
    vault
        .copy_to(&out, CopyPart::All, &Grouping::Prefix(4), false, false)
        .unwrap();
    assert!(out.join(&sha1[..4]).join(&sha1).exists());
}

#[test]
fn copy_to_skips_existing_without_force() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir(&src).unwrap();
    std::fs::write(src.join("game.bin"), b"payload").unwrap();

    let mut vault = Vault::new();
    vault
        .add_from_file(Path::new("game.bin"), Some(src.as_path()))
        .unwrap();

    let out = dir.path().join("out");
    vault
        .copy_to(&out, CopyPart::All, &Grouping::Flat, false, false)
        .unwrap();
    let summary = vault
        .copy_to(&out, CopyPart::All, &Grouping::Flat, false, false)
        .unwrap();
    assert_eq!(summary.copied, 0);
    assert_eq!(summary.skipped.len(), 1);
}

#[test]
fn copy_to_pristine_wipes_the_target() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir(&src).unwrap();
    std::fs::write(src.join("game.bin"), b"payload").unwrap();

    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();
    std::fs::write(out.join("leftover"), b"junk").unwrap();

    let mut vault = Vault::new();
    vault
        .add_from_file(Path::new("game.bin"), Some(src.as_path()))
        .unwrap();
    vault
        .copy_to(&out, CopyPart::All, &Grouping::Flat, true, false)
        .unwrap();
    assert!(!out.join("leftover").exists());
}

#[test]
fn copy_to_skips_virtual_roms() {
    let dir = TempDir::new().unwrap();
    let vault = vault_of(vec![rom("ghost.bin", 'a', "11111111")]);
    let summary = vault
        .copy_to(dir.path(), CopyPart::All, &Grouping::Flat, false, false)
        .unwrap();
    assert_eq!(summary.copied, 0);
    assert_eq!(summary.skipped, vec!["ghost.bin"]);
}

#[test]
fn index_snapshots_storage_state() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir(&src).unwrap();
    std::fs::write(src.join("game.bin"), b"payload").unwrap();

    let mut vault = Vault::new();
    vault
        .add_from_file(Path::new("game.bin"), Some(src.as_path()))
        .unwrap();
    // Virtual entries never make it into the snapshot.
    vault.push(rom("ghost.bin", 'f', "ffffffff"));

    let index = vault.index();
    assert_eq!(index.len(), 1);
    let (path, entry) = index.iter().next().unwrap();
    assert!(path.ends_with("game.bin"));
    assert_eq!(entry.size, Some(7));
    assert_eq!(entry.offset, None);
    assert!(entry.sha1.is_some());
    assert!(entry.timestamp.ends_with("UTC"));
}
