#![no_main]

use libfuzzer_sys::fuzz_target;
use markdown_html_converter::ffi::{
    ERROR_INTERNAL, ERROR_SUCCESS, md_html_convert, md_html_converter_free,
    md_html_converter_new, md_html_result_free,
};
use markdown_html_converter::{MdHtmlOptions, MdHtmlResult};

fuzz_target!(|data: &[u8]| {
    unsafe {
        let handle = md_html_converter_new();
        assert!(!handle.is_null());

        let options = MdHtmlOptions::default();
        let mut result = MdHtmlResult::default();
        md_html_convert(handle, data.as_ptr(), data.len(), &options, &mut result);

        assert_ne!(result.error_code, ERROR_INTERNAL);
        if result.error_code == ERROR_SUCCESS {
            assert!(result.error_message.is_null());
        } else {
            assert!(result.html.is_null());
        }

        md_html_result_free(&mut result);
        md_html_converter_free(handle);
    }
});
