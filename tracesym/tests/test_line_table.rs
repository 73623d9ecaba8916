use tracesym::domain::SymbolizeError;
use tracesym::symbolization::DebugLineTable;

const DUMP: &str = include_str!("data/decodedline_openssl.txt");

fn openssl_table() -> DebugLineTable {
    DebugLineTable::from_decoded_line_dump(DUMP)
}

#[test]
fn test_dump_loads_every_row() {
    let table = openssl_table();
    // 15 rows minus 4 end-of-sequence markers
    assert_eq!(table.len(), 11);
    assert_eq!(table.iter().next().map(|s| s.address), Some(0x2cca0));
    assert_eq!(table.iter().last().map(|s| s.address), Some(0xe7cbf));
}

#[test]
fn test_exact_mid_table_entry() {
    let table = openssl_table();
    let target = table.locate(0x8b1c0).expect("0x8b1c0 is in the table");
    assert_eq!(target.address, 0x8b1c0);
    assert_eq!(target.line_number, 412);
    assert_eq!(target.file_name, "bn_exp.c");
    assert_eq!(target.directory, "./crypto/bn/bn_exp.c");
}

#[test]
fn test_one_below_mid_entry_returns_preceding_row() {
    let table = openssl_table();
    let target = table.locate(0x8b1c0 - 1).unwrap();
    assert_eq!(target.address, 0x8b1ae);
    assert_eq!(target.line_number, 409);

    let target = table.locate(0x8b1c0 + 1).unwrap();
    assert_eq!(target.address, 0x8b1c0);
}

#[test]
fn test_first_entry_boundary() {
    let table = openssl_table();
    assert_eq!(table.locate(0x2cca0).map(|s| s.address), Some(0x2cca0));
    assert!(table.locate(0x2cca0 - 1).is_none());
    assert_eq!(table.locate(0x2cca0 + 1).map(|s| s.address), Some(0x2cca0));
}

#[test]
fn test_last_entry_boundary() {
    let table = openssl_table();
    assert_eq!(table.locate(0xe7cbf).map(|s| s.address), Some(0xe7cbf));
    assert_eq!(table.locate(0xe7cbf - 1).map(|s| s.address), Some(0xe7cb0));
    assert_eq!(table.locate(0xe7cbf + 1).map(|s| s.address), Some(0xe7cbf));
}

#[test]
fn test_header_sets_directory_for_included_file() {
    let table = openssl_table();
    let target = table.locate(0x8b1d8).unwrap();
    assert_eq!(target.file_name, "bn_lcl.h");
    assert_eq!(target.directory, "./crypto/bn/bn_lcl.h");
    assert_eq!(target.to_string(), "bn_lcl.h 8b1d4 301");
}

#[test]
fn test_floor_between_every_pair_of_rows() {
    let table = openssl_table();
    let rows: Vec<_> = table.iter().cloned().collect();
    for pair in rows.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if hi.address - lo.address > 1 {
            assert_eq!(table.locate(lo.address + 1), Some(lo));
            assert_eq!(table.locate(hi.address - 1), Some(lo));
        }
        assert_eq!(table.locate(hi.address), Some(hi));
    }
}

#[test]
fn test_dump_file_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("decodedline.txt");
    std::fs::write(&path, DUMP).unwrap();

    let table = DebugLineTable::from_decoded_line_dump_file(&path).unwrap();
    assert_eq!(table.len(), openssl_table().len());

    let missing = DebugLineTable::from_decoded_line_dump_file(dir.path().join("absent.txt"));
    assert!(matches!(missing, Err(SymbolizeError::Open { .. })));
}

#[test]
fn test_decode_own_binary() {
    // Test binaries are built with debug info, so the CLI binary has line tables
    let binary_path = env!("CARGO_BIN_EXE_tracesym");

    println!("Decoding line tables of: {binary_path}");

    let table = DebugLineTable::from_binary(binary_path).expect("Failed to decode line tables");
    assert!(!table.is_empty(), "dev build should carry DWARF line info");

    let addrs: Vec<u64> = table.iter().map(|s| s.address).collect();
    assert!(addrs.windows(2).all(|w| w[0] <= w[1]), "rows must be sorted");
    assert!(table.iter().all(|s| s.line_number > 0));

    let first = table.iter().next().unwrap();
    assert_eq!(table.locate(first.address).map(|s| s.address), Some(first.address));
    if first.address > 0 {
        assert!(table.locate(first.address - 1).is_none());
    }

    let rust_sources = table.iter().filter(|s| s.file_name.ends_with(".rs")).count();
    println!("{} rows, {rust_sources} in Rust sources", table.len());
    assert!(rust_sources > 0);
}

#[test]
fn test_non_object_file_is_decode_error() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), DUMP).unwrap();

    let err = DebugLineTable::from_binary(file.path()).unwrap_err();
    assert!(matches!(err, SymbolizeError::Decode { .. }), "unexpected: {err}");
}
