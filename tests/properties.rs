use proptest::prelude::*;

use text_align::graph::{lhs_text, rhs_text};
use text_align::run_length::{decode, encode};
use text_align::{AlignerParameters, AlignmentGraphNode, SmithWatermanContext};

// Opening a gap never costs less than extending one.
fn parameters() -> impl Strategy<Value = AlignerParameters<i32>> {
    (1..5i32, -4..=0i32, -3..=0i32, -3..=0i32).prop_map(|(identity, mismatch, gap_open_extra, gap)| {
        AlignerParameters::new(identity, mismatch, gap + gap_open_extra, gap)
    })
}

fn aligned(lhs: &str, rhs: &str, params: AlignerParameters<i32>) -> SmithWatermanContext {
    let mut ctx = SmithWatermanContext::new(lhs, rhs).with_parameters(params);
    ctx.align().unwrap();
    ctx
}

/// Scores the locally aligned part of an alignment from its gap vectors.
fn rescore(ctx: &SmithWatermanContext) -> i32 {
    let params = ctx.parameters();
    let alignment = ctx.alignment().unwrap();
    let core = alignment.local_positions.clone();

    let mut lhs = ctx.lhs()[alignment.lhs_range.clone()].iter();
    let mut rhs = ctx.rhs()[alignment.rhs_range.clone()].iter();
    let mut score = 0;
    let mut previous = (false, false);
    for k in core {
        let step = (alignment.lhs_gaps[k], alignment.rhs_gaps[k]);
        score += match step {
            (false, false) => {
                if lhs.next() == rhs.next() {
                    params.identity_score
                } else {
                    params.mismatch_penalty
                }
            }
            _ => {
                if step.0 {
                    rhs.next();
                } else {
                    lhs.next();
                }
                if step == previous {
                    params.gap_penalty
                } else {
                    params.gap_start_penalty
                }
            }
        };
        previous = step;
    }
    score
}

proptest! {
    #[test]
    fn codec_round_trip(bits in proptest::collection::vec(any::<bool>(), 0..64)) {
        let runs = encode(&bits);
        prop_assert!(runs.runs.iter().all(|&run| run > 0));
        prop_assert_eq!(runs.len(), Some(bits.len()));
        prop_assert_eq!(decode(&runs).unwrap(), bits);
    }

    #[test]
    fn graph_reconstructs_both_texts(lhs in "[abc]{0,12}", rhs in "[abc]{0,12}", params in parameters()) {
        let ctx = aligned(&lhs, &rhs, params);
        let graph = ctx.make_alignment_graph().unwrap();
        prop_assert_eq!(lhs_text(&graph), lhs);
        prop_assert_eq!(rhs_text(&graph), rhs);

        for pair in graph.windows(2) {
            prop_assert_ne!(pair[0].node_type(), pair[1].node_type());
        }
    }

    #[test]
    fn gaps_are_exclusive(lhs in "[abcd]{0,16}", rhs in "[abcd]{0,16}", params in parameters()) {
        let ctx = aligned(&lhs, &rhs, params);
        let lhs_gaps = ctx.lhs_gaps().unwrap();
        let rhs_gaps = ctx.rhs_gaps().unwrap();
        prop_assert_eq!(lhs_gaps.len(), rhs_gaps.len());
        prop_assert!(lhs_gaps.iter().zip(rhs_gaps).all(|(&l, &r)| !(l && r)));

        let diagonal = lhs_gaps.iter().zip(rhs_gaps).filter(|(l, r)| !**l && !**r).count();
        prop_assert_eq!(lhs_gaps.len(), lhs.chars().count() + rhs.chars().count() - diagonal);
        prop_assert_eq!(lhs_gaps.iter().filter(|&&g| !g).count(), lhs.chars().count());
        prop_assert_eq!(rhs_gaps.iter().filter(|&&g| !g).count(), rhs.chars().count());

        let alignment = ctx.alignment().unwrap();
        let lead = alignment.lhs_range.start + alignment.rhs_range.start;
        let tail = (lhs.chars().count() - alignment.lhs_range.end) + (rhs.chars().count() - alignment.rhs_range.end);
        prop_assert_eq!(alignment.local_positions.clone(), lead..alignment.len() - tail);
    }

    #[test]
    fn score_matches_the_reported_path(lhs in "[ab]{0,14}", rhs in "[ab]{0,14}", params in parameters()) {
        let ctx = aligned(&lhs, &rhs, params);
        prop_assert!(ctx.alignment_score().unwrap() >= 0);
        prop_assert_eq!(rescore(&ctx), ctx.alignment_score().unwrap());
    }

    #[test]
    fn alignment_is_deterministic(lhs in "[abc]{0,12}", rhs in "[abc]{0,12}", params in parameters()) {
        let first = aligned(&lhs, &rhs, params);
        let second = aligned(&lhs, &rhs, params);
        prop_assert_eq!(first.lhs_gaps().unwrap(), second.lhs_gaps().unwrap());
        prop_assert_eq!(first.rhs_gaps().unwrap(), second.rhs_gaps().unwrap());
        prop_assert_eq!(first.make_alignment_graph().unwrap(), second.make_alignment_graph().unwrap());
    }

    #[test]
    fn self_alignment_is_identity(text in "\\PC{1,20}", params in parameters()) {
        let ctx = aligned(&text, &text, params);
        let length = text.chars().count();
        prop_assert_eq!(
            ctx.make_alignment_graph().unwrap(),
            vec![AlignmentGraphNode::Common { text: text.clone() }]
        );
        let no_gaps = vec![false; length];
        prop_assert_eq!(ctx.lhs_gaps().unwrap(), no_gaps.as_slice());
        prop_assert_eq!(ctx.rhs_gaps().unwrap(), no_gaps.as_slice());
    }
}
