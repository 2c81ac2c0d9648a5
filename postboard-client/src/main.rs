use clap::Parser;
use postboard_client::{
    api::{ClientError, HttpPostsApi, PostsApi},
    board::Board,
    commands::{Command, HELP},
    render::render_board,
};
use std::num::NonZeroUsize;
use terminal::{Input, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod terminal;

/// Terminal front end for a postboard server
#[derive(Parser, Debug)]
#[command(name = "postboard", version, about)]
struct Args {
    /// Base URL of the postboard server
    #[arg(long, env = "POSTBOARD_SERVER", default_value = "http://127.0.0.1:3000")]
    server: String,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postboard=warn,postboard_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn nth_post<A: PostsApi>(board: &Board<A>, number: NonZeroUsize) -> Option<usize> {
    let index = number.get() - 1;
    (index < board.posts().len()).then_some(index)
}

/// Runs one command. Returns `false` once the session should end.
async fn execute<A: PostsApi>(
    board: &mut Board<A>,
    terminal: &mut Terminal,
    command: Command,
) -> std::io::Result<bool> {
    match command {
        Command::List => board.refresh().await,
        Command::Set(field, value) => board.visible_form_mut().set(field, value),
        Command::Save => {
            if board.visible_form().is_edit() {
                board.submit_edit().await;
            } else {
                board.submit_create().await;
            }
        }
        Command::Edit(number) => match nth_post(board, number) {
            Some(index) => {
                let id = board.posts()[index].id;
                board.start_edit(id);
            }
            None => println!("There is no post {number}"),
        },
        Command::Cancel => board.cancel_edit(),
        Command::Delete(number) => {
            let Some(index) = nth_post(board, number) else {
                println!("There is no post {number}");
                return Ok(true);
            };
            let id = board.posts()[index].id;
            board.request_delete(id);

            if terminal.confirm("Delete this post? [y/N]")? {
                board.confirm_delete().await;
            } else {
                board.cancel_delete();
            }
        }
        Command::Help => {
            println!("{HELP}");
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    }

    print!("{}", render_board(board));
    board.take_alert();
    Ok(true)
}

async fn run(api: HttpPostsApi) -> std::io::Result<()> {
    let mut board = Board::new(api);
    let mut terminal = Terminal::new();

    board.refresh().await;
    print!("{}", render_board(&board));
    board.take_alert();
    println!("Type `help` for the list of commands.");

    loop {
        let line = match terminal.read(">")? {
            Input::Line(line) => line,
            Input::Interrupt => {
                println!("^C (use `quit` to exit)");
                continue;
            }
            Input::Eof => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => {
                if !execute(&mut board, &mut terminal, command).await? {
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("Invalid server URL: {0}")]
    Client(#[from] ClientError),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), RunError> {
    let args = Args::parse();
    install_tracing();

    let api = HttpPostsApi::new(&args.server)?;
    run(api).await?;

    Ok(())
}
