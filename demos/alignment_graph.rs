use text_align::{AlignerParameters, PairScoreTable, ScoringFpContext, SmithWatermanContext};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut ctx = SmithWatermanContext::new("The quick brown fox", "The quack brown fix")
        .with_parameters(AlignerParameters::new(2, -1, -2, -1));
    let score = ctx.align()?;

    let (lhs_row, rhs_row) = ctx.aligned_texts()?;
    println!("Score: {}", score);
    println!("{}", lhs_row);
    println!("{}", rhs_row);

    for node in ctx.make_alignment_graph()? {
        println!("{}", node);
    }
    println!("lhs runs: {:?}", ctx.make_lhs_runs()?);
    println!("rhs runs: {:?}", ctx.make_rhs_runs()?);

    // OCR style confusions scored as partial matches.
    let table = PairScoreTable::new().with_pair('0', 'O', 1.5).with_pair('1', 'l', 1.5);
    let mut ctx = ScoringFpContext::new("HELLO W0RLD", "HELLO WORLD")
        .with_parameters(AlignerParameters::new(2.0, -1.0, -2.0, -1.0))
        .with_pair_scores(table);
    println!("Score with pair table: {}", ctx.align()?);
    println!("{:?}", ctx.statistics()?);

    Ok(())
}
