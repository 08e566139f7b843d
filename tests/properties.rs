//! 解析与比对的性质测试
//!
//! 用 proptest 随机生成文档和参数表，验证对任意输入都成立的规则。

use std::collections::BTreeMap;

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use prompt_qa_tool::services::write_rows;
use prompt_qa_tool::{compare, parse, FileNames, ParsedDocument, HEADERS};

/// 一行记录：(参数名, 值, 页码)
fn arb_line() -> impl Strategy<Value = (String, String, Option<u16>)> {
    ("[A-E]", "[a-z0-9 ]{0,6}", proptest::option::of(any::<u16>()))
}

fn render(lines: &[(String, String, Option<u16>)]) -> String {
    lines
        .iter()
        .map(|(name, value, page)| match page {
            Some(p) => format!("Sec::{}::{}::{}\n", name, value, p),
            None => format!("Sec::{}::{}\n", name, value),
        })
        .collect()
}

fn arb_document() -> impl Strategy<Value = ParsedDocument> {
    (
        btree_map("[A-D]{1,2}", "[ a-c1]{0,3}", 0..8),
        btree_map("[A-D]{1,2}", "[ 0-2]{0,2}", 0..8),
    )
        .prop_map(|(values, pages)| ParsedDocument { values, pages })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn parse_is_idempotent(text in "(.|\n|::){0,80}") {
        prop_assert_eq!(parse(&text), parse(&text));
    }

    #[test]
    fn later_lines_override_earlier_ones(lines in vec(arb_line(), 0..20)) {
        let mut values = BTreeMap::new();
        let mut pages = BTreeMap::new();
        for (name, value, page) in &lines {
            values.insert(name.clone(), value.trim().to_string());
            pages.insert(name.clone(), page.map(|p| p.to_string()).unwrap_or_default());
        }

        let doc = parse(&render(&lines));
        prop_assert_eq!(doc.values, values);
        prop_assert_eq!(doc.pages, pages);
    }

    #[test]
    fn rows_follow_qa_keys_only(qa in arb_document(), llm in arb_document()) {
        let rows = compare(&qa, &llm, &FileNames::new("qa.txt", "llm.txt"));

        prop_assert_eq!(rows.len(), qa.values.len());
        for row in &rows {
            prop_assert!(qa.values.contains_key(&row.parameter));
        }
        for name in llm.values.keys().filter(|k| !qa.values.contains_key(*k)) {
            prop_assert!(rows.iter().all(|r| &r.parameter != name));
        }
    }

    #[test]
    fn flags_are_trimmed_equality(qa in arb_document(), llm in arb_document()) {
        let rows = compare(&qa, &llm, &FileNames::default());

        for row in &rows {
            let qa_value = qa.value(&row.parameter).unwrap_or("").trim();
            let llm_value = llm.value(&row.parameter).unwrap_or("").trim();
            let qa_page = qa.page(&row.parameter).unwrap_or("").trim();
            let llm_page = llm.page(&row.parameter).unwrap_or("").trim();

            prop_assert_eq!(row.value_match, qa_value == llm_value);
            prop_assert_eq!(row.page_match, qa_page == llm_page);
        }
    }

    #[test]
    fn rows_are_sorted_by_parameter(qa in arb_document(), llm in arb_document()) {
        let rows = compare(&qa, &llm, &FileNames::default());
        prop_assert!(rows.windows(2).all(|w| w[0].parameter < w[1].parameter));
    }

    #[test]
    fn header_is_always_first_record(qa in arb_document(), llm in arb_document()) {
        let rows = compare(&qa, &llm, &FileNames::new("q", "l"));
        let text = String::from_utf8(write_rows(&rows).unwrap()).unwrap();

        let expected = format!("{}\r\n", HEADERS.join(","));
        prop_assert!(text.starts_with(&expected));
    }
}
