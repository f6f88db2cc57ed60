use proptest::prelude::*;
use sleep_report::label::{collapse_label, humanize_label};
use sleep_report::render::page_count;
use sleep_report::{render, PageLayout, RenderInstruction};

fn instruction() -> impl Strategy<Value = RenderInstruction> {
    prop_oneof![
        "[A-Za-z ]{0,16}".prop_map(RenderInstruction::title),
        "[A-Za-z ]{0,16}".prop_map(RenderInstruction::section),
        ("[a-z][a-zA-Z]{0,12}", any::<u32>())
            .prop_map(|(label, value)| RenderInstruction::field(label, value)),
        "[A-Za-z .,]{0,24}".prop_map(RenderInstruction::item),
    ]
}

fn layout() -> impl Strategy<Value = PageLayout> {
    (50u32..400, 0u32..40, 1u32..25).prop_filter_map(
        "top margin must lie on the page",
        |(page_height, top_margin, line_height)| {
            PageLayout::new(
                f64::from(page_height),
                f64::from(top_margin),
                f64::from(line_height),
            )
            .ok()
        },
    )
}

proptest! {
    #[test]
    fn one_line_per_instruction(
        instructions in prop::collection::vec(instruction(), 0..120),
        layout in layout(),
    ) {
        prop_assert_eq!(render(&instructions, &layout).len(), instructions.len());
    }

    #[test]
    fn lines_advance_by_line_height_within_a_page(
        instructions in prop::collection::vec(instruction(), 0..120),
        layout in layout(),
    ) {
        let lines = render(&instructions, &layout);
        for pair in lines.windows(2) {
            if pair[0].page_index == pair[1].page_index {
                prop_assert_eq!(pair[1].y, pair[0].y + layout.line_height());
            } else {
                prop_assert_eq!(pair[1].page_index, pair[0].page_index + 1);
                prop_assert_eq!(pair[1].y, layout.page_reset_y());
            }
        }
        prop_assert!(lines.iter().all(|line| line.y <= layout.page_height()));
    }

    #[test]
    fn page_capacity_matches_layout(
        count in 0usize..200,
        layout in layout(),
    ) {
        let instructions: Vec<_> = (0..count)
            .map(|index| RenderInstruction::field("Line", index))
            .collect();
        let lines = render(&instructions, &layout);

        let first = layout.lines_on_first_page();
        let rest = layout.lines_per_continuation_page();
        let expected_pages = if count == 0 {
            0
        } else if count <= first {
            1
        } else {
            1 + (count - first + rest - 1) / rest
        };
        prop_assert_eq!(page_count(&lines), expected_pages);
    }

    #[test]
    fn rendering_twice_is_identical(
        instructions in prop::collection::vec(instruction(), 0..60),
        layout in layout(),
    ) {
        prop_assert_eq!(render(&instructions, &layout), render(&instructions, &layout));
    }

    #[test]
    fn humanized_identifiers_collapse_back(name in "[a-zA-Z][a-zA-Z0-9]{0,20}") {
        prop_assert_eq!(collapse_label(&humanize_label(&name)), name);
    }
}
