use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use tokio::sync::mpsc;

use hushwire_transport::{SecureChat, TransportConfig};

const DEFAULT_SERVER: &str = "wss://127.0.0.1:8080";

#[derive(Debug)]
struct Config {
    server_url: String,
    insecure: bool,
}

enum UiEvent {
    Established,
    Message(String),
    Closed(String),
}

struct App {
    log: Vec<String>,
    input: String,
    status: String,
    server_url: String,
    last_draw: Instant,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let mut insecure = false;
    let mut server_url = DEFAULT_SERVER.to_string();

    // Minimal arg parsing
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--insecure-dev" => insecure = true,
            "--server" if i + 1 < args.len() => {
                server_url = args[i + 1].clone();
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    // Transport safety check
    if server_url.starts_with("ws://") && !insecure {
        eprintln!("ERROR: ws:// is only allowed with --insecure-dev on localhost.");
        return Ok(());
    }

    let config = Config {
        server_url,
        insecure,
    };

    let mut app = App {
        log: Vec::new(),
        input: String::new(),
        status: "Connecting...".to_string(),
        server_url: config.server_url.clone(),
        last_draw: Instant::now(),
    };

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, Clear(ClearType::All), cursor::Hide)?;

    if let Err(e) = app.run(config).await {
        app.log.push(format!("Error: {}", e));
    }

    disable_raw_mode()?;
    execute!(stdout, cursor::Show)?;
    println!("\nSession ended.");
    Ok(())
}

impl App {
    async fn run(&mut self, config: Config) -> Result<(), Box<dyn std::error::Error>> {
        let (ui_tx, mut ui_rx) = mpsc::channel::<UiEvent>(32);
        let (out_tx, mut out_rx) = mpsc::channel::<String>(32);

        // Networking task owns the session.
        tokio::spawn(async move {
            let mut transport = TransportConfig::new(&config.server_url);
            if config.insecure {
                transport = transport.with_insecure_dev();
            }

            let pending = match SecureChat::connect(transport).await {
                Ok(pending) => pending,
                Err(e) => {
                    let _ = ui_tx.send(UiEvent::Closed(e.to_string())).await;
                    return;
                }
            };
            // Blocks until a peer joins the relay and sends its key.
            let mut chat = match pending.establish().await {
                Ok(chat) => chat,
                Err(e) => {
                    let _ = ui_tx.send(UiEvent::Closed(e.to_string())).await;
                    return;
                }
            };
            let _ = ui_tx.send(UiEvent::Established).await;

            loop {
                tokio::select! {
                    msg = chat.recv() => match msg {
                        Ok(msg) => {
                            let text = msg.into_string();
                            if ui_tx.send(UiEvent::Message(text)).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            let _ = ui_tx.send(UiEvent::Closed(e.to_string())).await;
                            break;
                        }
                    },
                    out = out_rx.recv() => match out {
                        Some(text) => {
                            if chat.send_text(&text).await.is_err() {
                                let _ = ui_tx.send(UiEvent::Closed("send failed".into())).await;
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
            chat.close().await;
        });

        self.log.push(format!("Server: {}", self.server_url));
        self.log.push("Awaiting peer key...".to_string());

        let mut established = false;

        loop {
            if Instant::now().duration_since(self.last_draw) > Duration::from_millis(50) {
                self.draw()?;
                self.last_draw = Instant::now();
            }

            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    match event {
                        UiEvent::Established => {
                            established = true;
                            self.status = "SECURE".to_string();
                            self.log.push("Secure channel established.".to_string());
                        }
                        UiEvent::Message(text) => {
                            self.log.push(format!("Peer: {}", text));
                        }
                        UiEvent::Closed(reason) => {
                            self.status = format!("CLOSED ({})", reason);
                            self.log.push(format!("Connection closed: {}", reason));
                            self.draw()?;
                            return Ok(());
                        }
                    }
                }
                Ok(Ok(true)) = tokio::task::spawn_blocking(|| event::poll(Duration::from_millis(10))) => {
                    if let Event::Key(key) = event::read()? {
                        match key.code {
                            KeyCode::Enter => {
                                if !self.input.is_empty() {
                                    let text = std::mem::take(&mut self.input);
                                    if established {
                                        let _ = out_tx.send(text.clone()).await;
                                        self.log.push(format!("You: {}", text));
                                    } else {
                                        self.log.push("Cannot send: channel not ready".to_string());
                                    }
                                }
                            }
                            KeyCode::Char(c) => self.input.push(c),
                            KeyCode::Backspace => { self.input.pop(); }
                            KeyCode::Esc => return Ok(()),
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    fn draw(&self) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(stdout, cursor::MoveTo(0, 0))?;

        println!("Hushwire | Server: {}", self.server_url);
        println!("Status: {:<40}", self.status);
        println!("{}", "=".repeat(60));

        for i in 0..10 {
            execute!(stdout, cursor::MoveTo(0, 3 + i as u16))?;
            execute!(stdout, Clear(ClearType::CurrentLine))?;
            if let Some(line) = self.log.get(self.log.len().saturating_sub(10) + i) {
                println!("{}", line);
            }
        }

        execute!(stdout, cursor::MoveTo(0, 14))?;
        println!("{}", "-".repeat(60));
        execute!(stdout, Clear(ClearType::CurrentLine))?;
        print!("> {}", self.input);
        stdout.flush()?;
        Ok(())
    }
}
