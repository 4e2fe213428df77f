use text_align::{AlignmentOutput, AlignmentRequest, BatchAligner};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let requests: Vec<AlignmentRequest<i32>> = serde_json::from_str(
        r#"[
            {"left": "ACGTACGT", "right": "ACGTAGCT", "match": 2, "mismatch": -1, "gap_start": -2, "gap": -1},
            {"left": "kitten", "right": "sitting", "match": 2, "mismatch": -1, "gap_start": -2, "gap": -1,
             "create_alignment_graph": true},
            {"left": "", "right": "XYZ", "match": 2, "mismatch": -1, "gap_start": -2, "gap": -1}
        ]"#,
    )?;

    let workers = std::thread::available_parallelism().map_or(2, |n| n.get());
    let mut batch = BatchAligner::new(workers)?.with_cell_limit(1 << 24);

    for (i, output) in batch.align_parallel(requests)?.iter().enumerate() {
        match output {
            AlignmentOutput::Graph(nodes) => {
                let nodes: Vec<String> = nodes.iter().map(ToString::to_string).collect();
                println!("Alignment {}: {}", i, nodes.join(" "));
            }
            AlignmentOutput::Runs { .. } => println!("Alignment {}: {}", i, serde_json::to_string(output)?),
        }
    }

    Ok(())
}
