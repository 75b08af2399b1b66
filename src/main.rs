use clap::Parser;
use dsa_kg::config::args::{BuildArgs, Cli, Command, GraphArgs, GraphFileArgs, RenderFormat};
use dsa_kg::core::ConfigProvider;
use dsa_kg::search::locate_graph_file;
use dsa_kg::utils::{logger, validation::Validate};
use dsa_kg::{
    repl, visual, BuildEngine, DsaTutorEngine, GraphPipeline, HybridDescriber, KgError,
    KnowledgeGraphSearch, LocalStorage, Result, TomlConfig,
};
use std::path::Path;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, logger::LogFormat::from_flag(cli.json_logs));

    tracing::info!("Starting dsa-kg CLI");
    if cli.verbose {
        tracing::debug!("CLI command: {:?}", cli.command);
    }

    let outcome = match cli.command {
        Command::Build(args) => run_build(args).await,
        Command::Search { query, graph, json } => run_search(&query, &graph, json).await,
        Command::Ask {
            question,
            graph,
            json,
        } => run_ask(&question, &graph, json).await,
        Command::Graph(args) => run_graph(&args).await,
        Command::Stats { graph } => run_stats(&graph).await,
        Command::Repl { graph } => run_repl(&graph).await,
    };

    if let Err(e) = outcome {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        // 輸出用戶友好的錯誤信息
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 建議: {}", e.recovery_suggestion());

        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run_build(args: BuildArgs) -> Result<()> {
    match args.config.clone() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let mut config = TomlConfig::from_file(&path)?;

            // 應用命令列覆蓋設定
            config.apply_overrides(args.fast, args.monitor);
            let monitor = config.monitoring_enabled();
            build_with(config, monitor).await
        }
        None => {
            let monitor = args.monitor;
            build_with(args, monitor).await
        }
    }
}

async fn build_with<C>(config: C, monitor: bool) -> Result<()>
where
    C: ConfigProvider + Validate + 'static,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    if monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let describer = HybridDescriber::from_config(&config)?;
    let storage = LocalStorage::new(config.output_path());
    let pipeline = GraphPipeline::new(storage, config, describer);
    let engine = BuildEngine::new_with_monitoring(pipeline, monitor);

    let output_path = engine.run().await?;
    tracing::info!("✅ Knowledge graph built successfully!");
    println!("✅ Knowledge graph built successfully!");
    println!("📁 Output saved to: {}", output_path);
    Ok(())
}

async fn open_search(graph: &GraphFileArgs) -> Result<KnowledgeGraphSearch> {
    let path = locate_graph_file(graph.path.as_deref())?;
    tracing::info!("📂 Using knowledge graph: {}", path.display());
    KnowledgeGraphSearch::open(&path).await
}

async fn run_search(query: &str, graph: &GraphFileArgs, json: bool) -> Result<()> {
    let search = open_search(graph).await?;
    let results = search.comprehensive_search(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        repl::print_results(&mut std::io::stdout().lock(), &results)?;
    }
    Ok(())
}

async fn run_ask(question: &str, graph: &GraphFileArgs, json: bool) -> Result<()> {
    let tutor = DsaTutorEngine::new(open_search(graph).await?);
    let answer = tutor.answer(question);
    tracing::info!(
        "🎓 Answered '{}' via {:?} match",
        answer.query,
        answer.match_source
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
    } else {
        println!("{}", answer.answer_markdown);
    }
    Ok(())
}

async fn run_graph(args: &GraphArgs) -> Result<()> {
    let search = open_search(&args.graph).await?;

    let view = match args.concept.as_deref() {
        Some(concept) if !args.overview => {
            // 接受 key 或名稱
            let key = search
                .exact_search(concept)
                .map(|hit| hit.key)
                .or_else(|| search.fuzzy_search(concept).first().map(|hit| hit.key))
                .unwrap_or(concept);
            visual::neighborhood(&search, key)?
        }
        _ => visual::overview(search.graph()),
    };

    let rendered = match args.format {
        RenderFormat::Html => view.to_html()?,
        RenderFormat::Json => view.to_json()?,
    };

    match &args.out {
        Some(path) => {
            write_output(path, &rendered).await?;
            println!("📁 Graph saved to: {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}

async fn run_stats(graph: &GraphFileArgs) -> Result<()> {
    let search = open_search(graph).await?;
    repl::print_stats(&mut std::io::stdout().lock(), &search.stats())
}

async fn run_repl(graph: &GraphFileArgs) -> Result<()> {
    let search = match open_search(graph).await {
        Ok(search) => search,
        Err(e @ KgError::GraphNotFound { .. }) => {
            eprintln!("❌ Error: knowledge_graph.json not found. Build the graph first.");
            return Err(e);
        }
        Err(e) => return Err(e),
    };

    let tutor = DsaTutorEngine::new(search);
    let stdin = std::io::stdin();
    repl::run(&tutor, stdin.lock(), std::io::stdout())
}
