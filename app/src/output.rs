use scrag_ai::evidence::IndexStatus;
use scrag_core::domain::PipelineResult;
use scrag_core::error::AppError;

const RULE: &str = "======================================================================";

pub fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new("CLI_OUTPUT_FAILED", "Failed to encode output").with_details(e.to_string())
    })?;
    println!("{out}");
    Ok(())
}

pub fn print_result(result: &PipelineResult) {
    println!("{RULE}");
    println!("ANSWER:\n{}", result.answer);
    println!();
    println!("CONFIDENCE: {}%", result.confidence);
    println!("STATUS: {}", result.status);
    println!("NOTE: {}", result.status.delivery_note());
    println!("SOURCES USED: {}", result.num_sources);

    let unsupported = result.unsupported_claims();
    if !unsupported.is_empty() {
        println!();
        println!("UNSUPPORTED CLAIMS:");
        for claim in unsupported {
            println!("   - {claim}");
        }
    }
    println!("{RULE}");
}

pub fn print_status(status: &IndexStatus, sources: usize, embeddings_ok: Result<(), AppError>) {
    println!("index ready:   {}", status.ready);
    println!("sources:       {sources}");
    println!("chunks:        {}", status.chunk_count);
    if let Some(model) = status.model.as_deref() {
        println!("embed model:   {model}");
    }
    if let Some(dims) = status.dims {
        println!("dims:          {dims}");
    }
    if let Some(at) = status.updated_at.as_deref() {
        println!("updated at:    {at}");
    }
    match embeddings_ok {
        Ok(()) => println!("embeddings:    reachable"),
        Err(e) => println!("embeddings:    unreachable {e}"),
    }
}
