//! Interactive terminal front end for the todo service.
//!
//! Reads one command per line, applies it to a `TodoList`, executes the
//! resulting request, and redraws. `TODO_API_URL` (or the first argument)
//! names the server.

mod command;
mod transport;
mod view;

use std::io::{self, BufRead, Write};

use chrono::Utc;
use todo_core::{ListError, PendingCall, TodoClient, TodoList};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use command::{Command, HELP};
use transport::Transport;

const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";

struct App {
    list: TodoList,
    transport: Transport,
}

impl App {
    fn reload(&mut self) {
        match self.transport.execute(self.list.load_request()) {
            Ok(response) => {
                if let Err(err) = self.list.apply_load(response) {
                    println!("! could not load todos: {err}");
                }
            }
            Err(err) => println!("! {err}"),
        }
    }

    /// Execute one issued call and reconcile. Failures are reported and
    /// left for the user to retry.
    fn run(&mut self, pending: PendingCall) {
        let response = match self.transport.execute(pending.request.clone()) {
            Ok(response) => response,
            Err(err) => {
                println!("! {err}");
                return;
            }
        };
        if let Err(err) = self.list.reconcile(&pending, response) {
            println!("! server rejected the change: {err} (reload to resync)");
        }
    }

    fn issue(&mut self, result: Result<PendingCall, ListError>) {
        match result {
            Ok(pending) => self.run(pending),
            Err(err) => println!("! {err}"),
        }
    }

    fn row(&self, n: usize) -> Option<Uuid> {
        let id = self.list.visible().get(n).map(|t| t.id);
        if id.is_none() {
            println!("! no row {}", n + 1);
        }
        id
    }

    /// Returns `false` when the user asked to quit.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::Submit(text) => {
                self.list.set_draft(text);
                let result = self.list.submit(Utc::now());
                self.issue(result);
            }
            Command::Edit(n) => {
                if let Some(id) = self.row(n) {
                    if let Err(err) = self.list.begin_edit(id) {
                        println!("! {err}");
                    }
                }
            }
            Command::Cancel => self.list.cancel_edit(),
            Command::Toggle(n) => {
                if let Some(id) = self.row(n) {
                    let result = self.list.toggle(id);
                    self.issue(result);
                }
            }
            Command::Remove(n) => {
                if let Some(id) = self.row(n) {
                    let result = self.list.delete(id);
                    self.issue(result);
                }
            }
            Command::Filter(text) => self.list.set_filter(text),
            Command::Reload => self.reload(),
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
        }
        true
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let base_url = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TODO_API_URL").ok())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

    let mut app = App {
        list: TodoList::new(TodoClient::new(&base_url)),
        transport: Transport::new(),
    };
    app.reload();
    print!("{}", view::render(&app.list));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match command::parse(&line) {
            Ok(command) => {
                if !app.handle(command) {
                    break;
                }
            }
            Err(err) => println!("! {err}"),
        }
        print!("{}", view::render(&app.list));
    }
    Ok(())
}
