#![no_main]
use libfuzzer_sys::fuzz_target;
use raidsave::{ArchiveDecoder, DecodeOptions, EntryTable};

fuzz_target!(|data: &[u8]| {
    let options = DecodeOptions::new().with_require_version(false);
    let decoder = ArchiveDecoder::with_options(options);
    if let Ok(table) = EntryTable::from_slice_with(data, decoder.options()) {
        let _ = table.visited_scenes();
        let _ = table.construction_sites();

        let decoded = decoder.assemble(&table).unwrap();
        let json = decoded.archive().json().to_vec();
        let again = decoder.assemble(&table).unwrap().archive().json().to_vec();
        assert_eq!(json, again);

        decoded.archive().character_item_data.walk(|entry, _| {
            for variable in &entry.variables {
                let _ = variable.value();
            }
        });
    }
});
