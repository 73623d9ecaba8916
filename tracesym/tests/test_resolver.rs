use tracesym::domain::{ResolveMiss, RoutineRecord, StaticSymbol};
use tracesym::symbolization::{
    AddressResolver, DebugLineTable, ElfSymbolTable, RoutineTable, StaticSymbolIndex,
};

const DUMP: &str = include_str!("data/decodedline_openssl.txt");
const ROUTINES: &str = include_str!("data/rsa_new.routines");

fn openssl_symbols() -> ElfSymbolTable {
    ElfSymbolTable::from_symbols(
        [("OPENSSL_init", 0x2cca0), ("BN_mod_exp_mont", 0x8b190), ("OPENSSL_cleanse", 0xe7ca0)]
            .iter()
            .map(|&(name, value)| StaticSymbol { name: name.to_string(), value, size: 0 }),
    )
}

fn openssl_resolver() -> AddressResolver<ElfSymbolTable, RoutineTable> {
    AddressResolver::new(
        DebugLineTable::from_decoded_line_dump(DUMP),
        openssl_symbols(),
        RoutineTable::parse(ROUTINES, "rsa_new.routines").unwrap(),
    )
}

#[test]
fn test_runtime_address_resolves_to_source_line() {
    let resolver = openssl_resolver();

    // BN_mod_exp_mont + 0x30
    let target = resolver.resolve(0x7f3a_2b45_f1c0).expect("should resolve");
    assert_eq!(target.address, 0x8b1c0);
    assert_eq!(target.line_number, 412);
    assert_eq!(target.to_string(), "bn_exp.c 8b1c0 412");
}

#[test]
fn test_resolve_equals_locate_of_static_address() {
    let resolver = openssl_resolver();
    let runtime_base = 0x7f3a_2b4b_aca0;
    let static_base = 0xe7ca0;

    // OPENSSL_cleanse is 36 bytes long, end inclusive
    for offset in 0..=36 {
        assert_eq!(
            resolver.resolve(runtime_base + offset),
            resolver.line_table().locate(static_base + offset)
        );
    }
}

#[test]
fn test_address_past_routine_end_is_not_attributed() {
    let resolver = openssl_resolver();

    // One byte past OPENSSL_cleanse, and far into the gap before memcpy
    for address in [0x7f3a_2b4b_aca0 + 37, 0x7f3a_2b50_aca0] {
        assert_eq!(resolver.explain(address), Err(ResolveMiss::NoRoutine(address)));
        assert!(resolver.routines().describe(address).is_none());
    }
}

#[test]
fn test_library_routine_without_static_symbol() {
    let resolver = openssl_resolver();
    assert_eq!(
        resolver.explain(0x7f3a_2c00_0010),
        Err(ResolveMiss::UnknownSymbol("memcpy".to_string()))
    );
}

#[test]
fn test_address_before_any_routine() {
    let resolver = openssl_resolver();
    assert_eq!(resolver.explain(0x1000), Err(ResolveMiss::NoRoutine(0x1000)));
}

#[test]
fn test_resolver_is_shareable_across_threads() {
    let resolver = openssl_resolver();
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let target = resolver.resolve(0x7f3a_2b45_f1af).unwrap();
                assert_eq!(target.line_number, 409);
            });
        }
    });
}

#[test]
fn test_own_binary_composition() {
    // Pretend the CLI binary was traced with `main` loaded at a relocated base
    let binary_path = env!("CARGO_BIN_EXE_tracesym");

    let lines = DebugLineTable::from_binary(binary_path).expect("Failed to decode line tables");
    let symbols = ElfSymbolTable::from_binary(binary_path).expect("Failed to read symbols");
    let main = symbols.find_symbol("main").expect("main is in .symtab").clone();
    println!("main at static 0x{:x}", main.value);

    let runtime_base = 0x5555_0000_0000;
    let routines = RoutineTable::from_records(vec![RoutineRecord {
        name: "main".to_string(),
        module: binary_path.to_string(),
        start_address: runtime_base,
        size: Some(main.size),
    }]);
    let resolver = AddressResolver::new(lines, &symbols, &routines);

    for offset in 0..main.size.max(1) {
        assert_eq!(
            resolver.resolve(runtime_base + offset),
            resolver.line_table().locate(main.value + offset),
            "offset 0x{offset:x}"
        );
    }
    assert!(resolver.resolve(runtime_base - 1).is_none());
}

#[test]
fn test_open_from_files() {
    let binary_path = env!("CARGO_BIN_EXE_tracesym");
    let dir = tempfile::tempdir().unwrap();
    let routines_path = dir.path().join("tracesym.routines");
    std::fs::write(&routines_path, format!("0x7f0000000000;{binary_path};main;16\n")).unwrap();

    let resolver = AddressResolver::open(binary_path, &routines_path).expect("Failed to open");
    assert_eq!(resolver.routines().len(), 1);

    let main = resolver.symbols().find_symbol("main").unwrap().value;
    assert_eq!(resolver.static_address(0x7f00_0000_0008), Ok(main + 8));
    assert_eq!(resolver.resolve(0x7f00_0000_0008), resolver.line_table().locate(main + 8));

    let missing = AddressResolver::open(binary_path, dir.path().join("absent.routines"));
    assert!(matches!(missing, Err(tracesym::domain::SymbolizeError::Open { .. })));
}

#[test]
fn test_imported_routines_are_unknown_symbols() {
    // libc functions are undefined entries in the CLI binary's .symtab
    let binary_path = env!("CARGO_BIN_EXE_tracesym");
    let symbols = ElfSymbolTable::from_binary(binary_path).expect("Failed to read symbols");

    for import in ["memcpy", "malloc", "write"] {
        assert!(symbols.find_symbol(import).is_none(), "{import} has no static address");
    }
    assert!(symbols.find_symbol("main").is_some_and(|main| main.value != 0));

    let routines = RoutineTable::parse(
        "0x7f3a2c000000;/lib/x86_64-linux-gnu/libc.so.6;memcpy;245\n",
        "libc.routines",
    )
    .unwrap();
    let lines = DebugLineTable::from_binary(binary_path).expect("Failed to decode line tables");
    let resolver = AddressResolver::new(lines, &symbols, routines);

    assert_eq!(
        resolver.explain(0x7f3a_2c00_0040),
        Err(ResolveMiss::UnknownSymbol("memcpy".to_string()))
    );
}
