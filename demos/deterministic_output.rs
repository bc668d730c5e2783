/// Example demonstrating deterministic HTML output
///
/// This example shows how the converter produces identical output for identical markdown
/// input, and how one converter can be shared across threads.
///
/// Run with: cargo run --example deterministic_output
use std::sync::Arc;
use std::thread;

use markdown_html_converter::HtmlConverter;

const DOCUMENT: &str = r#"# Main Title

This is a paragraph with **bold** and *italic* text.

Here's a [link](https://example.com) and an image: ![Test Image](image.png)

- First item
- Second item with `inline code`
- Third item
  - Nested item 1
  - Nested item 2

| Key | Value |
|-----|------:|
| a   | 1     |

```rust
fn main() {
    println!("Hello, world!");
}
```
"#;

fn main() {
    println!("=== Deterministic HTML Output Example ===\n");

    println!("Converting markdown 5 times...\n");

    let converter = HtmlConverter::new();
    let mut results = Vec::new();
    for i in 1..=5 {
        let html = converter.convert(DOCUMENT).expect("Failed to convert");
        println!("Conversion {}: {} bytes", i, html.len());
        results.push(html);
    }

    println!("\nVerifying deterministic output...");
    let first = &results[0];
    let all_identical = results.iter().all(|r| r == first);

    if all_identical {
        println!("✓ SUCCESS: All 5 conversions produced identical output!");
        println!("\nHTML output:\n{}", "=".repeat(80));
        println!("{}", first);
        println!("{}", "=".repeat(80));
    } else {
        println!("✗ FAILURE: Conversions produced different output!");
        std::process::exit(1);
    }

    println!("\nConverting on 4 threads with one shared converter...");
    let shared = Arc::new(converter);
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let converter = Arc::clone(&shared);
            thread::spawn(move || converter.convert(DOCUMENT).expect("Failed to convert"))
        })
        .collect();

    let threaded: Vec<String> = handles
        .into_iter()
        .map(|handle| handle.join().expect("Conversion thread panicked"))
        .collect();

    if threaded.iter().all(|html| html == first) {
        println!("✓ SUCCESS: Every thread produced the same output!");
    } else {
        println!("✗ FAILURE: Threads disagreed!");
        std::process::exit(1);
    }
}
