/*!
 * Tests for text slicing and regrouping
 */

use doctrans::slicer::{
    count_tokens, slice_long_paragraph, split_into_paragraphs, split_into_sentences, SliceGroup,
    TextSlicer,
};

fn slicer(target_tokens: usize) -> TextSlicer {
    TextSlicer::new(target_tokens, "<SEP>")
}

#[test]
fn test_countTokens_withAsciiText_shouldFloorByteQuarters() {
    assert_eq!(count_tokens(""), 0);
    assert_eq!(count_tokens("abc"), 0);
    assert_eq!(count_tokens("abcd"), 1);
    assert_eq!(count_tokens("abcdefg"), 1);
    assert_eq!(count_tokens("abcdefgh"), 2);
}

#[test]
fn test_countTokens_withMultibyteText_shouldCountBytesNotChars() {
    // Two CJK characters are six UTF-8 bytes
    assert_eq!(count_tokens("你好"), 1);
    assert_eq!(count_tokens("你好你好"), 3);
}

#[test]
fn test_splitIntoParagraphs_withBlankLineBoundaries_shouldSplit() {
    let paragraphs = split_into_paragraphs("first\n\nsecond\n \nthird");
    assert_eq!(paragraphs, vec!["first", "second", "third"]);
}

#[test]
fn test_splitIntoParagraphs_withLeadingAndTrailingBlanks_shouldKeepEmptyPieces() {
    let paragraphs = split_into_paragraphs("\n\nonly one\n\n");
    assert_eq!(paragraphs, vec!["", "only one", ""]);
}

#[test]
fn test_splitIntoSentences_withLatinPunctuation_shouldSplitAtBoundaries() {
    let sentences = split_into_sentences("One sentence. Another one! A third? The last");
    assert_eq!(
        sentences,
        vec!["One sentence.", "Another one!", "A third?", "The last"]
    );
}

#[test]
fn test_splitIntoSentences_withCjkPunctuation_shouldSplitWithoutSpaces() {
    let sentences = split_into_sentences("第一句。第二句！第三句？");
    assert_eq!(sentences, vec!["第一句。", "第二句！", "第三句？"]);
}

#[test]
fn test_splitIntoSentences_withNoPunctuation_shouldReturnWholeParagraph() {
    let sentences = split_into_sentences("no terminal punctuation here");
    assert_eq!(sentences, vec!["no terminal punctuation here"]);
}

#[test]
fn test_sliceLongParagraph_withShortSentences_shouldAccumulateGreedily() {
    // Each sentence is 11 bytes -> 2 tokens; a budget of 4 tokens fits two
    let paragraph = "aaaaaaaaaa. bbbbbbbbbb. cccccccccc. dddddddddd.";
    let slices = slice_long_paragraph(paragraph, 4);
    assert_eq!(
        slices,
        vec!["aaaaaaaaaa. bbbbbbbbbb.", "cccccccccc. dddddddddd."]
    );
}

#[test]
fn test_sliceLongParagraph_withOversizedSentence_shouldKeepItUnsplit() {
    let long_sentence = format!("{}.", "x".repeat(100));
    let paragraph = format!("Short. {} Tail here.", long_sentence);
    let slices = slice_long_paragraph(&paragraph, 5);

    assert_eq!(slices.len(), 3);
    assert_eq!(slices[0], "Short.");
    assert_eq!(slices[1], long_sentence);
    assert!(count_tokens(&slices[1]) > 5);
    assert_eq!(slices[2], "Tail here.");
}

#[test]
fn test_process_withEmptyInput_shouldProduceZeroGroups() {
    assert!(slicer(1024).process("").is_empty());
}

#[test]
fn test_process_withOnlyBlankLines_shouldProduceOnlyEmptyGroups() {
    let groups = slicer(1024).process("\n\n");
    assert_eq!(groups, vec![SliceGroup::Empty, SliceGroup::Empty]);
}

#[test]
fn test_process_withTwoShortParagraphs_shouldGroupIntoOneNormal() {
    let groups = slicer(1024).process("Para one.\n\nPara two.");
    assert_eq!(
        groups,
        vec![SliceGroup::Normal(vec![
            "Para one.".to_string(),
            "Para two.".to_string()
        ])]
    );
}

#[test]
fn test_process_withBudgetOverflow_shouldFlushPendingGroup() {
    // 20 bytes -> 5 tokens and 24 bytes -> 6 tokens; 5 + 6 exceeds 10
    let text = format!("{}\n\n{}", "a".repeat(20), "b".repeat(24));
    let groups = slicer(10).process(&text);
    assert_eq!(
        groups,
        vec![
            SliceGroup::Normal(vec!["a".repeat(20)]),
            SliceGroup::Normal(vec!["b".repeat(24)]),
        ]
    );
}

#[test]
fn test_process_withParagraphExactlyAtBudget_shouldFit() {
    // 20 bytes -> exactly 5 tokens; the boundary is >, not >=
    let text = "a".repeat(20);
    let groups = slicer(5).process(&text);
    assert_eq!(groups, vec![SliceGroup::Normal(vec![text])]);
}

#[test]
fn test_process_withLeadingAndTrailingBlanks_shouldEmitEmptyGroups() {
    let groups = slicer(1024).process("\n\nHello there.\n\n");
    assert_eq!(
        groups,
        vec![
            SliceGroup::Empty,
            SliceGroup::Normal(vec!["Hello there.".to_string()]),
            SliceGroup::Empty,
        ]
    );
}

#[test]
fn test_process_withLongParagraph_shouldSliceAtSentenceBoundaries() {
    // A paragraph of 4 * target + 400 bytes must split into several
    // sentence-bounded slices, each within the budget
    let target = 100;
    let sentence = "This is a fairly ordinary sentence used for slicing. ";
    let mut paragraph = String::new();
    while paragraph.len() < 4 * target + 400 {
        paragraph.push_str(sentence);
    }

    let groups = slicer(target).process(&paragraph);
    assert!(groups.len() >= 2);

    for group in &groups {
        match group {
            SliceGroup::LongParagraphSlice { paragraph, text } => {
                assert_eq!(*paragraph, 0);
                assert!(count_tokens(text) <= target);
            }
            other => panic!("expected only long-paragraph slices, got {:?}", other),
        }
    }
}

#[test]
fn test_process_withParagraphUnderBudget_shouldNeverSentenceSlice() {
    let text = "A full paragraph. With several sentences. None of them sliced.";
    assert!(count_tokens(text) <= 1024);

    let groups = slicer(1024).process(text);
    assert_eq!(groups, vec![SliceGroup::Normal(vec![text.to_string()])]);
}

#[test]
fn test_process_withMixedDocument_shouldKeepNormalGroupsWithinBudget() {
    let target = 12;
    let text = "\
One short one.\n\n\
Another short one.\n\n\
A third short paragraph.\n\n\
Tiny.\n\n\
The last paragraph here.";

    let groups = slicer(target).process(text);
    assert!(!groups.is_empty());

    for group in &groups {
        if let SliceGroup::Normal(paragraphs) = group {
            let total: usize = paragraphs.iter().map(|p| count_tokens(p)).sum();
            assert!(
                total <= target,
                "normal group exceeds budget: {:?} ({} tokens)",
                paragraphs,
                total
            );
        }
    }
}

#[test]
fn test_process_withAdjacentLongParagraphs_shouldKeepParagraphIndexesDistinct() {
    // Two over-budget paragraphs back to back; their slices must not be
    // attributable to a single paragraph
    let target = 5;
    let text = format!(
        "{}\n\n{}",
        "First long block. ".repeat(4),
        "Second long block. ".repeat(4)
    );

    let groups = slicer(target).process(&text);
    let mut indexes = Vec::new();
    for group in &groups {
        match group {
            SliceGroup::LongParagraphSlice { paragraph, .. } => indexes.push(*paragraph),
            other => panic!("expected only long-paragraph slices, got {:?}", other),
        }
    }

    assert!(indexes.contains(&0));
    assert!(indexes.contains(&1));
}

#[test]
fn test_needsTranslation_shouldBeFalseOnlyForEmpty() {
    assert!(!SliceGroup::Empty.needs_translation());
    assert!(SliceGroup::Normal(vec!["text".to_string()]).needs_translation());
    assert!(SliceGroup::LongParagraphSlice {
        paragraph: 0,
        text: "text".to_string()
    }
    .needs_translation());
}

#[test]
fn test_joinWithSeparator_shouldPutSentinelOnItsOwnLine() {
    let joined = slicer(1024).join_with_separator(&["one".to_string(), "two".to_string()]);
    assert_eq!(joined, "one\n<SEP>\ntwo");
}

#[test]
fn test_splitBySeparator_shouldTrimEachPiece() {
    let pieces = slicer(1024).split_by_separator("  one \n<SEP>\n two ");
    assert_eq!(pieces, vec!["one".to_string(), "two".to_string()]);
}

/// Reassemble slicer output with translation replaced by identity,
/// mirroring the orchestrator's write behavior
fn reconstruct(slicer: &TextSlicer, text: &str) -> String {
    let groups = slicer.process(text);
    let mut output = String::new();

    let mut index = 0;
    while index < groups.len() {
        match &groups[index] {
            SliceGroup::Empty => {
                output.push_str("\n\n");
                index += 1;
            }
            SliceGroup::Normal(paragraphs) => {
                let joined = slicer.join_with_separator(paragraphs);
                for piece in slicer.split_by_separator(&joined) {
                    output.push_str(&piece);
                    output.push_str("\n\n");
                }
                index += 1;
            }
            SliceGroup::LongParagraphSlice { paragraph, text } => {
                let paragraph = *paragraph;
                let mut block = text.clone();
                index += 1;
                while index < groups.len() {
                    match &groups[index] {
                        SliceGroup::LongParagraphSlice { paragraph: next, text }
                            if *next == paragraph =>
                        {
                            block.push_str(text);
                            index += 1;
                        }
                        _ => break,
                    }
                }
                output.push_str(block.trim());
                output.push_str("\n\n");
            }
        }
    }

    output
}

#[test]
fn test_reconstruct_withIdentityTranslation_shouldPreserveParagraphSequence() {
    let slicer = slicer(1024);

    assert_eq!(
        reconstruct(&slicer, "Para one.\n\nPara two."),
        "Para one.\n\nPara two.\n\n"
    );
    assert_eq!(
        reconstruct(&slicer, "\n\nA.\n\nB.\n\n"),
        "\n\nA.\n\nB.\n\n\n\n"
    );
    assert_eq!(reconstruct(&slicer, ""), "");
}

#[test]
fn test_reconstruct_withSmallBudget_shouldKeepParagraphOrder() {
    // Budget forces one group per paragraph; order and blanks must survive
    let slicer = TextSlicer::new(3, "<SEP>");
    let text = "First here.\n\nSecond here.\n\nThird here.";
    assert_eq!(
        reconstruct(&slicer, text),
        "First here.\n\nSecond here.\n\nThird here.\n\n"
    );
}
