use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ordhent_acquire::output::{self as handoff, WordList};
use ordhent_acquire::phrontistery::{self, Phrontistery, ALPHABET};
use ordhent_acquire::translate::{self, GoogleTranslator, DEFAULT_TARGET};
use ordhent_enrich::dictionary::DEFAULT_DICTIONARY;
use ordhent_enrich::{CleanOptions, DescribeOptions, Execution, Ordbokene, Plan};
use ordhent_store::config::{DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_HOST};
use ordhent_store::{Backend, MemoryStore, MongoStore, Store, StoreConfig};

#[derive(Parser)]
#[command(name = "ordhent")]
#[command(about = "Scrape English vocabulary, translate it to Norwegian and enrich it from the dictionary")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(flatten)]
    store: StoreArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Args)]
struct StoreArgs {
    /// MongoDB user
    #[arg(long, global = true, env = "MONGO_USR", hide_env_values = true)]
    mongo_user: Option<String>,

    /// MongoDB password
    #[arg(long, global = true, env = "MONGO_PWD", hide_env_values = true)]
    mongo_password: Option<String>,

    /// MongoDB Atlas host
    #[arg(long, global = true, default_value = DEFAULT_HOST)]
    mongo_host: String,

    /// Full MongoDB connection string (overrides --mongo-host), e.g. "mongodb://localhost:27017"
    #[arg(long, global = true, env = "MONGO_URI", hide_env_values = true)]
    mongo_uri: Option<String>,

    #[arg(long, global = true, default_value = DEFAULT_DATABASE)]
    database: String,

    #[arg(long, global = true, default_value = DEFAULT_COLLECTION)]
    collection: String,

    /// Keep the collection in a local JSON file instead of MongoDB
    #[arg(long, global = true, value_name = "FILE")]
    memory: Option<String>,
}

impl StoreArgs {
    fn config(&self) -> StoreConfig {
        StoreConfig {
            user: self.mongo_user.clone(),
            password: self.mongo_password.clone(),
            host: self.mongo_host.clone(),
            uri: self.mongo_uri.clone(),
            database: self.database.clone(),
            collection: self.collection.clone(),
        }
    }

    /// Acquire the store for this run. Callers close it before exiting.
    async fn open(&self) -> Result<Backend> {
        match &self.memory {
            Some(path) => Ok(Backend::Memory(MemoryStore::open(path)?)),
            None => Ok(Backend::Mongo(MongoStore::connect(&self.config()).await?)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the English word lists, one page per letter
    Fetch {
        /// Letters to fetch, in order
        #[arg(short, long, default_value = ALPHABET)]
        letters: String,

        /// Output file for the word list JSON
        #[arg(short, long, default_value = "words.json")]
        output: String,
    },

    /// Translate a fetched word list into Norwegian
    Translate {
        /// Word list JSON written by `fetch`
        #[arg(short, long, default_value = "words.json")]
        input: String,

        /// Output file for the translated vocabulary JSON
        #[arg(short, long, default_value = "vocabulary.json")]
        output: String,

        /// Target language code
        #[arg(long, default_value = DEFAULT_TARGET)]
        target: String,
    },

    /// Upsert a translated vocabulary into the store, keyed on the English word
    Save {
        /// Vocabulary JSON written by `translate`
        #[arg(short, long, default_value = "vocabulary.json")]
        input: String,
    },

    /// Fetch, translate and save in one run
    Acquire {
        /// Letters to fetch, in order
        #[arg(short, long, default_value = ALPHABET)]
        letters: String,

        /// Target language code
        #[arg(long, default_value = DEFAULT_TARGET)]
        target: String,
    },

    /// Look every stored translation up in the dictionary; queue deletes for unknown words
    Clean {
        /// Only entries that have no dictionary IDs yet
        #[arg(long)]
        pending: bool,

        /// Only count exact headword matches
        #[arg(long)]
        exact: bool,

        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Add pronunciation and etymology from the dictionary articles
    Describe {
        /// Norwegian word to describe (all entries when omitted)
        word: Option<String>,

        /// Maximum number of entries to describe
        #[arg(long)]
        limit: Option<i64>,

        /// Also store explanation and example texts
        #[arg(long)]
        detailed: bool,

        #[command(flatten)]
        batch: BatchArgs,
    },
}

#[derive(Args)]
struct BatchArgs {
    /// Dictionary code: "bm" (Bokmål) or "nn" (Nynorsk)
    #[arg(long, default_value = DEFAULT_DICTIONARY)]
    dictionary: String,

    /// Submit the batch. Without this the batch is only built and reported.
    #[arg(long)]
    apply: bool,

    /// Write the built batch to this JSON file
    #[arg(long, value_name = "FILE")]
    plan: Option<String>,
}

impl BatchArgs {
    fn execution(&self) -> Execution {
        if self.apply {
            Execution::Apply
        } else {
            Execution::DryRun
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, keeping HTML-parsing and driver internals quiet at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn  => "warn",
        LogLevel::Info  => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn,mongodb=warn,hyper=warn,reqwest=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn,mongodb=warn,hyper=warn,reqwest=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-02-14 19:44:09.123 -08:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.command {
        Commands::Fetch { letters, output } => {
            tracing::info!(letters = %letters, output = %output, "Fetching word lists");
            let source = Phrontistery::new()?;
            let words = phrontistery::fetch(&source, &letters).await?;
            handoff::write_words(&WordList::new(phrontistery::BASE_URL, &letters, words), &output)?;
        }
        Commands::Translate { input, output, target } => {
            tracing::info!(input = %input, output = %output, target = %target, "Translating");
            let list = handoff::read_words(&input)?;
            let translator = GoogleTranslator::new(&target)?;
            let entries = translate::translate(&translator, &list.words).await?;
            handoff::write_vocabulary(&entries, &output)?;
        }
        Commands::Save { input } => {
            tracing::info!(input = %input, "Saving vocabulary");
            let entries = handoff::read_vocabulary(&input)?;
            let store = cli.store.open().await?;
            let saved = ordhent_store::save(&store, &entries).await;
            store.close().await?;
            saved?;
        }
        Commands::Acquire { letters, target } => {
            tracing::info!(letters = %letters, target = %target, "Acquiring vocabulary");
            let source = Phrontistery::new()?;
            let translator = GoogleTranslator::new(&target)?;
            let words = phrontistery::fetch(&source, &letters).await?;
            let entries = translate::translate(&translator, &words).await?;

            let store = cli.store.open().await?;
            let saved = ordhent_store::save(&store, &entries).await;
            store.close().await?;
            saved?;
        }
        Commands::Clean { pending, exact, batch } => {
            let dictionary = Ordbokene::new(&batch.dictionary)?.exact(exact);
            let options = CleanOptions {
                execution: batch.execution(),
                pending_only: pending,
            };

            let store = cli.store.open().await?;
            let plan = ordhent_enrich::clean(&store, &dictionary, &options).await;
            store.close().await?;
            report(&plan?, batch.plan.as_deref())?;
        }
        Commands::Describe { word, limit, detailed, batch } => {
            let dictionary = Ordbokene::new(&batch.dictionary)?;
            let options = DescribeOptions {
                word,
                limit,
                execution: batch.execution(),
                detailed,
            };

            let store = cli.store.open().await?;
            let plan = ordhent_enrich::describe(&store, &dictionary, &options).await;
            store.close().await?;
            report(&plan?, batch.plan.as_deref())?;
        }
    }

    Ok(())
}

fn report(plan: &Plan, path: Option<&str>) -> Result<()> {
    tracing::info!(
        deletes = plan.deletes(),
        updates = plan.updates(),
        submitted = plan.submitted.is_some(),
        "Pass finished"
    );

    if let Some(path) = path {
        let json = serde_json::to_string_pretty(plan)?;
        std::fs::write(path, &json)?;
        tracing::info!(path = %path, operations = plan.operations.len(), "Wrote batch plan");
    }

    Ok(())
}
