use crate::core::{
    cart::{Cart, LookupOutcome},
    config::{BarcoConfig, ReceiptConfig},
    console::{ConsoleCommand, ConsoleParser, ItemRef, HELP_LINES},
    error::{BarcoError, Result},
    lookup::{LookupCompletion, LookupWorkers, OfflineCatalog, OpenFoodFacts, ProductCatalog},
    print_error, print_info, print_success, print_usage, print_warning,
    printer::{render_receipt, write_receipt, ReceiptFormat},
    receipt::{format_money, ReceiptDocument},
    scanner::{ScanEvent, ScannerSession},
    templates::{render_template, TemplateContext, TEMPLATES, UNKNOWN_AMOUNT, UNPRICED_FLAG},
};
use clap::Args;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread;

#[derive(Args, Debug, Default)]
pub struct SessionArgs {
    /// Scanner device to read barcodes from (tty, FIFO or file, one barcode per line)
    #[arg(long)]
    pub device: Option<PathBuf>,

    /// Skip catalog lookups; every product needs a manual price
    #[arg(long)]
    pub offline: bool,
}

/// Everything the session thread reacts to, in arrival order
#[derive(Debug)]
pub enum SessionEvent {
    Console(String),
    ConsoleClosed,
    Scanner(ScanEvent),
    Lookup(LookupCompletion),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn execute_session(args: SessionArgs, config: &BarcoConfig) -> Result<()> {
    let catalog: Arc<dyn ProductCatalog> = if args.offline {
        Arc::new(OfflineCatalog)
    } else {
        Arc::new(OpenFoodFacts::new(&config.lookup)?)
    };

    let (events, inbox) = channel::<SessionEvent>();
    let (workers, requests) = LookupWorkers::spawn(
        catalog,
        config.lookup.workers,
        events.clone(),
        SessionEvent::Lookup,
    );
    log::debug!("Started {} lookup worker(s)", workers.len());

    let cart = Cart::new(Box::new(requests));
    let mut session = CheckoutSession::new(cart, config.receipt.clone(), events.clone());

    print_info(&format!(
        "{} - Transaction ID: {}",
        config.receipt.store_name,
        session.cart().transaction_id()
    ));
    print_info("Scan or type a barcode. Type 'help' for commands.");

    if let Some(device) = args.device {
        if let Err(e) = session.start_scanner(Some(device)) {
            print_error(&e.to_string());
        }
    }

    spawn_console_reader(events);

    for event in inbox {
        if session.handle(event) == Flow::Quit {
            break;
        }
    }

    session.finish();
    Ok(())
}

fn spawn_console_reader(events: Sender<SessionEvent>) {
    let spawned = thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if events.send(SessionEvent::Console(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        log::warn!("Console read failed: {e}");
                        break;
                    }
                }
            }
            let _ = events.send(SessionEvent::ConsoleClosed);
        });

    if let Err(e) = spawned {
        log::error!("Could not start console reader: {e}");
    }
}

/// Owns the cart for one checkout and applies events to it
pub struct CheckoutSession {
    cart: Cart,
    receipt_config: ReceiptConfig,
    events: Sender<SessionEvent>,
    scanner: Option<ScannerSession>,
    last_device: Option<PathBuf>,
    generation: u64,
}

impl CheckoutSession {
    pub fn new(cart: Cart, receipt_config: ReceiptConfig, events: Sender<SessionEvent>) -> Self {
        Self {
            cart,
            receipt_config,
            events,
            scanner: None,
            last_device: None,
            generation: 0,
        }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn is_scanning(&self) -> bool {
        self.scanner.is_some()
    }

    pub fn handle(&mut self, event: SessionEvent) -> Flow {
        match event {
            SessionEvent::Console(line) => match self.handle_console(&line) {
                Ok(flow) => flow,
                Err(e) => {
                    print_error(&e.to_string());
                    Flow::Continue
                }
            },
            SessionEvent::ConsoleClosed => Flow::Quit,
            SessionEvent::Scanner(event) => {
                self.handle_scanner(event);
                Flow::Continue
            }
            SessionEvent::Lookup(completion) => {
                self.handle_lookup(completion);
                Flow::Continue
            }
        }
    }

    fn handle_console(&mut self, line: &str) -> Result<Flow> {
        match ConsoleParser::parse(line)? {
            ConsoleCommand::Scan(barcode) => self.scan(&barcode)?,
            ConsoleCommand::Quantity { item, quantity } => {
                let barcode = item.resolve(&self.cart)?;
                self.cart.set_quantity(&barcode, quantity)?;
                self.report_row(&barcode);
            }
            ConsoleCommand::Price { item, price } => {
                let barcode = item.resolve(&self.cart)?;
                self.cart.set_manual_price(&barcode, price)?;
                self.report_row(&barcode);
            }
            ConsoleCommand::Remove(item) => self.remove(&item),
            ConsoleCommand::List => self.print_cart(),
            ConsoleCommand::Receipt { format, path } => {
                self.print_receipt(format, path.as_deref())?
            }
            ConsoleCommand::Start(device) => self.start_scanner(device)?,
            ConsoleCommand::Stop => self.stop_scanner()?,
            ConsoleCommand::Help => print_usage("Commands", HELP_LINES),
            ConsoleCommand::Quit => return Ok(Flow::Quit),
            ConsoleCommand::Empty => {}
        }
        Ok(Flow::Continue)
    }

    fn scan(&mut self, barcode: &str) -> Result<()> {
        let is_new = self.cart.get(barcode).is_none();
        let id = self.cart.apply_scan(barcode)?;

        if is_new {
            if self.cart.is_lookup_pending(barcode) {
                print_success(&format!("Added {barcode} ({id}), looking up product..."));
            } else {
                print_success(&format!("Added {barcode} ({id})"));
            }
        } else {
            self.report_row(barcode);
        }
        Ok(())
    }

    fn remove(&mut self, item: &ItemRef) {
        let removed = item
            .resolve(&self.cart)
            .map(|barcode| (self.cart.remove_item(&barcode), barcode));

        match removed {
            Ok((true, barcode)) => print_success(&format!("Removed {barcode}")),
            Ok((false, barcode)) => log::debug!("Remove of absent {barcode} ignored"),
            Err(e) => log::debug!("Remove ignored: {e}"),
        }
    }

    fn handle_scanner(&mut self, event: ScanEvent) {
        let current = self.scanner.as_ref().map(ScannerSession::generation);
        if current != Some(event.generation()) {
            log::debug!("Dropping event from stopped scanner {}", event.generation());
            return;
        }

        match event {
            ScanEvent::Scanned { barcode, .. } => {
                if let Err(e) = self.scan(&barcode) {
                    print_error(&e.to_string());
                }
            }
            ScanEvent::Closed { error, .. } => {
                self.scanner = None;
                match error {
                    Some(e) => print_warning(&format!("Scanner closed: {e}")),
                    None => print_warning("Scanner input ended"),
                }
            }
        }
    }

    fn handle_lookup(&mut self, completion: LookupCompletion) {
        let LookupCompletion { barcode, result } = completion;
        let prompt = format!("Enter a price with: price {barcode} <amount>");

        match self.cart.apply_lookup_result(&barcode, result) {
            LookupOutcome::Patched => self.report_row(&barcode),
            LookupOutcome::PriceMissing => {
                let name = self
                    .cart
                    .get(&barcode)
                    .map(|item| item.name.clone())
                    .unwrap_or_default();
                print_warning(&format!("{barcode}: {name} has no listed price. {prompt}"));
            }
            LookupOutcome::NotFound => {
                let err = BarcoError::product_not_found(&barcode);
                print_warning(&format!("{err}. {prompt}"));
            }
            LookupOutcome::Failed(reason) => print_warning(&format!("{reason}. {prompt}")),
            LookupOutcome::Stale => log::debug!("Lookup for removed {barcode} discarded"),
        }
    }

    pub fn start_scanner(&mut self, device: Option<PathBuf>) -> Result<()> {
        if self.scanner.is_some() {
            return Err(BarcoError::ScannerAlreadyRunning);
        }
        let device = device
            .or_else(|| self.last_device.clone())
            .ok_or_else(|| BarcoError::usage("start <PATH>"))?;

        self.generation += 1;
        let scanner = ScannerSession::start(
            &device,
            self.generation,
            self.events.clone(),
            SessionEvent::Scanner,
        )?;

        print_success(&format!("Scanner started on {}", device.display()));
        self.last_device = Some(device);
        self.scanner = Some(scanner);
        Ok(())
    }

    pub fn stop_scanner(&mut self) -> Result<()> {
        let scanner = self.scanner.take().ok_or(BarcoError::ScannerNotRunning)?;
        let device = scanner.device().display().to_string();
        scanner.stop();
        print_success(&format!("Scanner on {device} stopped"));
        Ok(())
    }

    /// Release the scanner and summarise the session
    pub fn finish(&mut self) {
        if let Some(scanner) = self.scanner.take() {
            scanner.stop();
        }
        if self.cart.pending_lookups() > 0 {
            log::debug!(
                "{} lookup(s) still in flight at session end",
                self.cart.pending_lookups()
            );
        }
        print_info(&format!(
            "Session {} closed with {} row(s)",
            self.cart.transaction_id(),
            self.cart.len()
        ));
    }

    fn report_row(&self, barcode: &str) {
        let Some(item) = self.cart.get(barcode) else {
            return;
        };
        let currency = &self.receipt_config.currency_symbol;
        match (item.unit_price, item.line_total()) {
            (Some(unit), Some(total)) => print_success(&format!(
                "{barcode}: {} x{} @ {currency}{} = {currency}{}",
                item.name,
                item.quantity,
                format_money(unit),
                format_money(total)
            )),
            _ => print_success(&format!(
                "{barcode}: {} x{} (price pending)",
                item.name, item.quantity
            )),
        }
    }

    fn print_cart(&self) {
        let transaction_id = self.cart.transaction_id().to_string();
        let header = TemplateContext {
            transaction_id: Some(&transaction_id),
            ..Default::default()
        };
        println!("\n{}", render_template(TEMPLATES.cart_header, &header));

        if self.cart.is_empty() {
            println!(
                "{}\n",
                render_template(TEMPLATES.cart_empty, &TemplateContext::default())
            );
            return;
        }

        for (n, item) in self.cart.items().iter().enumerate() {
            let unit_price = item.unit_price.map(format_money);
            let line_total = item.line_total().map(format_money);
            let context = TemplateContext {
                n: Some(n + 1),
                barcode: Some(&item.barcode),
                name: Some(&item.name),
                quantity: Some(item.quantity),
                unit_price: Some(unit_price.as_deref().unwrap_or(UNKNOWN_AMOUNT)),
                line_total: Some(line_total.as_deref().unwrap_or(UNKNOWN_AMOUNT)),
                flag: item.line_total().is_none().then_some(UNPRICED_FLAG),
                ..Default::default()
            };
            println!("{}", render_template(TEMPLATES.cart_line, &context));
        }

        let receipt = ReceiptDocument::format(&self.cart);
        println!(
            "\n   Total: {}{}\n",
            self.receipt_config.currency_symbol,
            format_money(receipt.grand_total)
        );
    }

    fn print_receipt(&self, format: ReceiptFormat, path: Option<&Path>) -> Result<()> {
        let receipt = ReceiptDocument::format(&self.cart);
        let rendered = render_receipt(&receipt, format, &self.receipt_config)?;
        write_receipt(&rendered, path)?;

        if let Some(path) = path {
            print_success(&format!("Receipt saved to {}", path.display()));
        }
        if !receipt.is_complete() {
            print_warning(&format!(
                "{} item(s) still need a price",
                receipt.unpriced_lines
            ));
        }
        Ok(())
    }
}
