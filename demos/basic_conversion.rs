//! Basic conversion example demonstrating the markdown to HTML converter

use markdown_html_converter::converter::{ConversionOptions, HtmlConverter};

fn main() {
    println!("=== Markdown HTML Converter - Basic Examples ===\n");

    // Example 1: Headers, paragraphs and emphasis
    example_1();

    // Example 2: Tables with column alignment
    example_2();

    // Example 3: Nested lists with task checkboxes
    example_3();

    // Example 4: Blockquote wrapping a table
    example_4();

    // Example 5: Header ids and the document outline
    example_5();
}

fn show(title: &str, markdown: &str, converter: &HtmlConverter) {
    println!("{}", title);
    println!("Input markdown:");
    println!("{}\n", markdown);

    let html = converter.convert(markdown).expect("Conversion failed");

    println!("Output HTML:");
    println!("{}", html);
    println!("---\n");
}

fn example_1() {
    show(
        "Example 1: Headers, paragraphs and emphasis",
        "# Welcome\n\nThis is **bold**, _italic_ and ***both***.\nSee [the docs](docs.html \"Docs\").",
        &HtmlConverter::new(),
    );
}

fn example_2() {
    show(
        "Example 2: Tables with column alignment",
        "| Item | Qty | Price |\n|:-----|:---:|------:|\n| Tea  | 2   | 3.50  |\n| `a|b` | 1 | 0.99 |",
        &HtmlConverter::new(),
    );
}

fn example_3() {
    show(
        "Example 3: Nested lists with task checkboxes",
        "- [x] Write parser\n- [ ] Write docs\n  - [ ] API\n  - [x] Tutorial\n\n3. third\n4. fourth",
        &HtmlConverter::new(),
    );
}

fn example_4() {
    show(
        "Example 4: Blockquote wrapping a table",
        "> Results:\n> | Run | Time |\n> |-----|-----:|\n> | 1   | 12ms |",
        &HtmlConverter::new(),
    );
}

fn example_5() {
    println!("Example 5: Header ids and the document outline");
    let markdown = "# Guide\n\n## Install\n\n## Usage\n\n## Usage";
    println!("Input markdown:");
    println!("{}\n", markdown);

    let converter = HtmlConverter::with_options(ConversionOptions {
        heading_ids: true,
        ..Default::default()
    });
    let result = converter
        .convert_with_outline(markdown)
        .expect("Conversion failed");

    println!("Output HTML:");
    println!("{}\n", result.html);
    println!("Outline:");
    for heading in &result.headings {
        println!(
            "{}- {} (#{})",
            "  ".repeat(usize::from(heading.level) - 1),
            heading.text,
            heading.slug
        );
    }
    println!("---\n");
}
