use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;
use colored::Colorize;

#[derive(Clone)]
enum Sink {
    Stdout,
    Silent,
    Buffer(Rc<RefCell<String>>),
}

/// Captured narration of a buffered [`Task`].
#[derive(Clone)]
pub struct TaskLog(Rc<RefCell<String>>);

impl TaskLog {
    pub fn contents(&self) -> String {
        self.0.borrow().clone()
    }
}

/// Narrates what the manager is doing as a tree of steps.
///
/// ```text
/// Installing 1.15.2 linux-amd64:
/// [+] Downloading: https://go.dev/dl/go1.15.2.linux-amd64.tar.gz
/// [+] Verifying integrity: 2d75848ac606061efe52a8068d0e647b35ce487a15bb52272c427df485193602
/// ```
///
/// Narration is write-only: nothing a task prints ever feeds back into control flow.
#[derive(Clone)]
pub struct Task {
    indent: usize,
    sink: Sink,
}

impl Task {
    pub fn stdout() -> Self {
        Self {
            indent: 0,
            sink: Sink::Stdout,
        }
    }

    pub fn silent() -> Self {
        Self {
            indent: 0,
            sink: Sink::Silent,
        }
    }

    /// A task that records its narration in memory instead of printing it.
    pub fn buffered() -> (Self, TaskLog) {
        let buffer = Rc::new(RefCell::new(String::new()));
        let task = Self {
            indent: 0,
            sink: Sink::Buffer(buffer.clone()),
        };
        (task, TaskLog(buffer))
    }

    /// A nested step, indented one level deeper.
    pub fn step(&self) -> Self {
        Self {
            indent: self.indent + 1,
            sink: self.sink.clone(),
        }
    }

    pub fn print(&self, message: impl Display) {
        let message = message.to_string();
        match &self.sink {
            Sink::Stdout => println!("{}", render(self.indent, &"[+]".green().to_string(), &message)),
            Sink::Silent => {}
            Sink::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(&render(self.indent, "[+]", &message));
                buffer.push('\n');
            }
        }
    }

    pub fn fail(&self, message: impl Display) {
        let message = message.to_string();
        match &self.sink {
            Sink::Stdout => eprintln!("{}", render(self.indent, &"[-]".red().to_string(), &message)),
            Sink::Silent => {}
            Sink::Buffer(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(&render(self.indent, "[-]", &message));
                buffer.push('\n');
            }
        }
    }

    /// Announces `description`, runs `action` and reports a failure if it returns one.
    /// The result is passed through untouched.
    pub fn track<T, E: Display>(
        &self,
        description: impl Display,
        action: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.print(description);
        let result = action();
        if let Err(e) = &result {
            self.fail(e);
        }
        result
    }
}

fn render(indent: usize, prefix: &str, message: &str) -> String {
    match indent {
        0 => message.to_string(),
        1 => format!("{prefix} {message}"),
        n => format!(" {}{prefix} {message}", "  ".repeat(n - 1)),
    }
}
