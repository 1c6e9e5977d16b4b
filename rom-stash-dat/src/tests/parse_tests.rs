use super::*;

const LOGIQX: &str = r#"<?xml version="1.0"?>
<!DOCTYPE datafile PUBLIC "-//Logiqx//DTD ROM Management Datafile//EN" "http://www.logiqx.com/Dats/datafile.dtd">
<datafile>
	<header><name>X</name><version>1</version></header>
	<game name="G"><rom name="a.bin" size="4" crc="11111111"/></game>
</datafile>"#;

const CLRMAMEPRO: &str = r#"
clrmamepro ( name "Y" version 1 )
game ( name "H" rom ( name b.bin size 8 crc 22222222 ) )
"#;

#[test]
fn dispatch_detects_logiqx() {
    let dat = parse_dat(LOGIQX.as_bytes()).unwrap();
    assert_eq!(dat.meta().name, "X");
    assert_eq!(dat.games()[0].name, "G");
}

#[test]
fn dispatch_falls_back_to_clrmamepro() {
    let dat = parse_dat(CLRMAMEPRO.as_bytes()).unwrap();
    assert_eq!(dat.meta().name, "Y");
    assert_eq!(dat.games()[0].name, "H");
}

#[test]
fn unknown_content_is_a_content_error() {
    assert!(matches!(
        parse_dat(b"definitely not a dat"),
        Err(DatError::Content(_))
    ));
}

#[test]
fn parse_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("test.dat");
    std::fs::write(&path, CLRMAMEPRO).unwrap();
    let dat = parse_dat_file(&path).unwrap();
    assert_eq!(dat.games().len(), 1);
}
