use anyhow::Result;
use clap::{Parser, Subcommand};
use kit::areas::repository::Repository;
use kit::commands::porcelain::reset::ResetMode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kit",
    version = "0.1.0",
    about = "A small local version control engine",
    long_about = "kit keeps content-addressed snapshots of a working tree, \
    with branches, stashes, resets and interactive rebases. \
    Everything lives in a local .kit directory.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<String>,
    },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints a commit from the commit log, or a blob or tree from the object store. \
        Commits may be named by a unique prefix."
    )]
    CatFile {
        #[arg(index = 1, help = "The object id to print")]
        oid: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object store",
        long_about = "This command computes the blob id of a file and can write the blob to the object store."
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: String,
    },
    #[command(name = "add", about = "Stage files for the next commit")]
    Add {
        #[arg(short = 'A', long, help = "Stage every change in the working tree")]
        all: bool,
        #[arg(
            required_unless_present = "all",
            help = "Files or directories to stage ('.' for everything)"
        )]
        paths: Vec<String>,
    },
    #[command(name = "rm", about = "Remove files from the working tree and the index")]
    Rm {
        #[arg(short, long, help = "Allow recursive removal of directories")]
        recursive: bool,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    #[command(
        name = "mv",
        about = "Move or rename a tracked file or directory",
        long_about = "This command moves a tracked path in the working tree and updates the index. \
        An existing directory as destination receives the source under its own name."
    )]
    Mv {
        #[arg(short, long, help = "Overwrite an existing destination")]
        force: bool,
        #[arg(index = 1)]
        source: String,
        #[arg(index = 2)]
        destination: String,
    },
    #[command(name = "status", about = "Show staged, unstaged and untracked changes")]
    Status {
        #[arg(short, long, alias = "porcelain", help = "Print one 'XY path' line per change")]
        short: bool,
    },
    #[command(name = "ls-files", about = "List the files tracked by the index")]
    LsFiles {
        #[arg(short, long, help = "Print the blob id before each path")]
        stage: bool,
    },
    #[command(
        name = "clean",
        about = "Remove untracked files from the working tree",
        long_about = "This command deletes files the index does not track. \
        It refuses to run without -f; -n only lists what would be removed."
    )]
    Clean {
        #[arg(short, long)]
        force: bool,
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command records the index as a new commit. With --amend, HEAD is replaced \
        by a new commit with the same parent."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
        #[arg(long, help = "Replace the HEAD commit instead of adding a new one")]
        amend: bool,
        #[arg(short, long, help = "Stage changes to tracked files before committing")]
        all: bool,
    },
    #[command(name = "branch", about = "List, create or delete branches")]
    Branch {
        #[arg(short, long, help = "Delete the named branch")]
        delete: bool,
        #[arg(index = 1)]
        name: Option<String>,
        #[arg(index = 2, help = "Start point of the new branch (defaults to HEAD)")]
        start: Option<String>,
    },
    #[command(name = "checkout", about = "Switch branches or detach HEAD at a commit")]
    Checkout {
        #[arg(short = 'b', help = "Create the branch at HEAD and switch to it")]
        create: bool,
        #[arg(index = 1)]
        target: String,
    },
    #[command(name = "tag", about = "List or create tags")]
    Tag {
        #[arg(short, long, help = "List tags")]
        list: bool,
        #[arg(index = 1)]
        name: Option<String>,
        #[arg(index = 2, help = "Commit to tag (defaults to HEAD)")]
        revision: Option<String>,
    },
    #[command(name = "config", about = "Read or write repository settings")]
    Config {
        #[arg(index = 1, help = "Dotted key, e.g. user.name")]
        key: String,
        #[arg(index = 2)]
        value: Option<String>,
    },
    #[command(
        name = "reset",
        about = "Move HEAD to a commit",
        long_about = "This command moves HEAD (and the current branch) to a commit. --mixed also resets the \
        index, --hard also resets the working tree."
    )]
    Reset {
        #[arg(long, value_enum, default_value_t = ResetMode::Mixed)]
        mode: ResetMode,
        #[arg(long, conflicts_with_all = ["mixed", "hard"])]
        soft: bool,
        #[arg(long, conflicts_with = "hard")]
        mixed: bool,
        #[arg(long)]
        hard: bool,
        #[arg(index = 1, default_value = "HEAD")]
        revision: String,
    },
    #[command(name = "stash", about = "Shelve uncommitted changes")]
    Stash {
        #[command(subcommand)]
        action: Option<StashAction>,
    },
    #[command(
        name = "rebase",
        about = "Interactively replay commits onto a base",
        long_about = "This command opens the todo list of the commits after <base> in an editor \
        and replays them. Actions: pick, reword, squash, drop."
    )]
    Rebase {
        #[arg(short, long, help = "Edit the todo list (always on)")]
        interactive: bool,
        #[arg(long = "continue", conflicts_with = "abort")]
        continue_rebase: bool,
        #[arg(long)]
        abort: bool,
        #[arg(index = 1, required_unless_present_any = ["continue_rebase", "abort"])]
        base: Option<String>,
    },
}

#[derive(Subcommand)]
enum StashAction {
    #[command(about = "Save the changes and reset to HEAD (default)")]
    Push {
        #[arg(short, long)]
        message: Option<String>,
    },
    #[command(about = "Apply the newest stash and remove it")]
    Pop,
    #[command(about = "Apply a stash and keep it")]
    Apply {
        #[arg(index = 1, default_value_t = 0)]
        index: usize,
    },
    #[command(about = "Remove a stash without applying it")]
    Drop {
        #[arg(index = 1, default_value_t = 0)]
        index: usize,
    },
    #[command(about = "List stashes, newest first")]
    List,
    #[command(about = "Remove every stash")]
    Clear,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn open_repository() -> Result<Repository> {
    let pwd = std::env::current_dir()?;

    Repository::new(&pwd.to_string_lossy(), Box::new(std::io::stdout()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { path } => {
            let repository = match path {
                Some(path) => Repository::new(&path, Box::new(std::io::stdout()))?,
                None => open_repository()?,
            };

            repository.init()
        }
        Commands::CatFile { oid } => open_repository()?.cat_file(&oid),
        Commands::HashObject { write, file } => open_repository()?.hash_object(&file, write),
        Commands::Add { all: true, .. } => open_repository()?.add_all(),
        Commands::Add { all: false, paths } => open_repository()?.add(&paths),
        Commands::Rm { recursive, paths } => open_repository()?.rm(&paths, recursive),
        Commands::Mv {
            force,
            source,
            destination,
        } => open_repository()?.mv(&source, &destination, force),
        Commands::Status { short } => open_repository()?.status(short),
        Commands::LsFiles { stage } => open_repository()?.ls_files(stage),
        Commands::Clean { force, dry_run } => open_repository()?.clean(force, dry_run),
        Commands::Commit {
            message,
            amend,
            all,
        } => {
            let repository = open_repository()?;
            let commit_id = match all {
                true => repository.commit_all(&message, amend)?,
                false => repository.commit(&message, amend)?,
            };
            tracing::debug!(commit = %commit_id, "committed");

            Ok(())
        }
        Commands::Branch {
            delete,
            name,
            start,
        } => {
            let repository = open_repository()?;
            match (name, delete) {
                (Some(name), true) => repository.delete_branch(&name),
                (Some(name), false) => repository.branch(&name, start.as_deref()),
                (None, true) => anyhow::bail!("branch name required"),
                (None, false) => repository.list_branches(),
            }
        }
        Commands::Checkout { create, target } => open_repository()?.checkout(&target, create),
        Commands::Tag {
            list,
            name,
            revision,
        } => {
            let repository = open_repository()?;
            match name {
                Some(name) if !list => repository.tag(&name, revision.as_deref()),
                _ => repository.list_tags(),
            }
        }
        Commands::Config { key, value } => {
            open_repository()?.config_command(&key, value.as_deref())
        }
        Commands::Reset {
            mode,
            soft,
            mixed,
            hard,
            revision,
        } => {
            let mode = match (soft, mixed, hard) {
                (true, _, _) => ResetMode::Soft,
                (_, true, _) => ResetMode::Mixed,
                (_, _, true) => ResetMode::Hard,
                _ => mode,
            };

            open_repository()?.reset(&revision, mode)
        }
        Commands::Stash { action } => {
            let repository = open_repository()?;
            match action.unwrap_or(StashAction::Push { message: None }) {
                StashAction::Push { message } => {
                    repository.stash_push(message.as_deref()).map(|_| ())
                }
                StashAction::Pop => repository.stash_pop(),
                StashAction::Apply { index } => repository.stash_apply(index),
                StashAction::Drop { index } => repository.stash_drop(index),
                StashAction::List => repository.stash_list(),
                StashAction::Clear => repository.stash_clear(),
            }
        }
        Commands::Rebase {
            interactive: _,
            continue_rebase,
            abort,
            base,
        } => {
            let repository = open_repository()?;
            match (continue_rebase, abort, base) {
                (true, _, _) => repository.rebase_continue(),
                (_, true, _) => repository.rebase_abort(),
                (_, _, Some(base)) => repository.rebase_interactive(&base),
                (_, _, None) => anyhow::bail!("a base commit is required"),
            }
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}
