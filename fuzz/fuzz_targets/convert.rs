#![no_main]

use libfuzzer_sys::fuzz_target;
use markdown_html_converter::{ConversionError, ConversionOptions, HtmlConverter};

fuzz_target!(|data: &[u8]| {
    let converter = HtmlConverter::with_options(ConversionOptions {
        heading_ids: data.first().is_some_and(|b| b & 1 == 1),
        ..Default::default()
    });

    match converter.convert_bytes(data, None) {
        Ok(conversion) => {
            // Identical input must give identical output
            let again = converter
                .convert_bytes(data, None)
                .expect("second conversion failed");
            assert_eq!(conversion, again);
        }
        Err(ConversionError::InternalError(message)) => {
            panic!("internal error on fuzz input: {}", message);
        }
        Err(_) => {}
    }
});
