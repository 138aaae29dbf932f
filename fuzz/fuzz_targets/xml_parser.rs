#![no_main]
use libfuzzer_sys::fuzz_target;
use linexml::{Config, Parser};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let config = Config::default().with_max_continuation_lines(3);
        if let Ok(root) = Parser::with_config(s, config).parse() {
            let _ = root.children_in_order().count();
            let _ = root.destroy();
        }
    }
});
