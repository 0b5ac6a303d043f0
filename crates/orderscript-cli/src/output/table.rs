use orderscript_core::model::{ParsedOrder, ParsedProductLine};
use orderscript_core::reconcile::{BatchDecision, ReconciliationResult, Severity};
use orderscript_core::trace::{TraceBundle, TraceVisibility};
use orderscript_core::Preview;
use rust_decimal::Decimal;

pub fn print_parsed(orders: &[ParsedOrder]) {
    for (i, order) in orders.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_header(order);
        println!("  Lines:");
        print_script_lines(&order.lines);
    }
    println!("\n{} order(s) parsed", orders.len());
}

pub fn print_preview(preview: &Preview, verbose: bool) {
    for (i, (order, result)) in preview.orders.iter().zip(&preview.results).enumerate() {
        if i > 0 {
            println!();
        }
        print_header(order);
        print_resolved_lines(&order.lines);
        print_totals(result);
        print_flags(result);
    }

    let grand: Decimal = preview.results.iter().map(|r| r.totals.total).sum();
    println!(
        "\n{} order(s), grand total {}",
        preview.orders.len(),
        grand
    );
    print_decision(&preview.decision);
    print_warnings(&preview.trace, verbose);

    if verbose {
        print_trace(&preview.trace);
    }
}

fn print_header(order: &ParsedOrder) {
    let name = if order.customer_name.is_empty() {
        "(no name)"
    } else {
        order.customer_name.as_str()
    };
    println!("=== Order #{}: {} ===\n", order.sequence_number, name);

    let phones = match (order.phone1.is_empty(), order.phone2.is_empty()) {
        (true, _) => "-".to_string(),
        (false, true) => order.phone1.clone(),
        (false, false) => format!("{} / {}", order.phone1, order.phone2),
    };
    print_field("Phone", &phones);
    print_field("Governorate", &order.governorate);
    print_field("Address", &order.address);
    print_field("Employee", &order.employee_raw);
    print_field("Page", &order.page_raw);
    print_field("Notes", &order.notes);
    println!(
        "  {:<12} price {}, shipping {}, total {}",
        "Declared:", order.declared_price, order.declared_shipping, order.declared_total
    );
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("  {:<12} {}", format!("{label}:"), value);
    }
}

fn variant(line: &ParsedProductLine) -> String {
    match (line.color.is_empty(), line.size.is_empty()) {
        (true, true) => String::new(),
        (false, true) => format!(" [{}]", line.color),
        (true, false) => format!(" [{}]", line.size),
        (false, false) => format!(" [{} / {}]", line.color, line.size),
    }
}

fn print_script_lines(lines: &[ParsedProductLine]) {
    if lines.is_empty() {
        println!("    (none)");
        return;
    }
    for (idx, line) in lines.iter().enumerate() {
        let qty_marker = if line.quantity_defaulted { "?" } else { "" };
        println!(
            "    {}. {}{} x {}{} @ {}  ({})",
            idx + 1,
            line.quantity,
            qty_marker,
            line.name,
            variant(line),
            line.script_price,
            line.parse_mode
        );
    }
}

fn print_resolved_lines(lines: &[ParsedProductLine]) {
    println!("\n  Lines:");
    if lines.is_empty() {
        println!("    (none)");
        return;
    }

    let max_name = lines
        .iter()
        .map(|l| l.name.chars().count() + variant(l).chars().count())
        .max()
        .unwrap_or(10);

    for (idx, line) in lines.iter().enumerate() {
        let label = format!("{}{}", line.name, variant(line));
        let product = match (&line.resolved_product_id, line.match_tier) {
            (Some(id), Some(tier)) => format!("-> {id} ({tier})"),
            _ => "-> not in catalog".to_string(),
        };
        println!(
            "    {}. {:>3} x {:<width$}  {:>10} = {:>10}  {}  [{}]",
            idx + 1,
            line.quantity,
            label,
            line.resolved_price,
            line.line_total,
            product,
            line.price_source,
            width = max_name
        );
    }
}

fn print_totals(result: &ReconciliationResult) {
    let t = &result.totals;
    println!();
    println!("  {:<12} {}", "Subtotal:", t.subtotal);
    if !t.discount.is_zero() {
        println!("  {:<12} -{}", "Discount:", t.discount);
    }
    if !t.tax.is_zero() {
        println!("  {:<12} +{}", "Tax:", t.tax);
    }
    println!("  {:<12} +{}", "Shipping:", t.shipping);
    println!("  {:<12} {}", "Total:", t.total);
    if result.totals_mismatch {
        println!("  {:<12} {}", "Script says:", result.required_total);
    }
}

fn print_flags(result: &ReconciliationResult) {
    if result.flags.is_empty() {
        println!("\n  OK");
        return;
    }
    println!();
    for (severity, heading) in [(Severity::Hard, "Blocking"), (Severity::Soft, "Warnings")] {
        let flags: Vec<_> = result.flags_of(severity).collect();
        if flags.is_empty() {
            continue;
        }
        println!("  {heading}:");
        for flag in flags {
            match flag.line {
                Some(idx) => println!("    - line {}: {}", idx + 1, flag.message),
                None => println!("    - {}", flag.message),
            }
        }
    }
}

fn print_decision(decision: &BatchDecision) {
    match decision {
        BatchDecision::Ready => println!("Batch: ready to commit"),
        BatchDecision::Rejected { .. } => {
            println!("Batch: {decision}");
            println!("  Fix blocking problems before committing.");
        }
        BatchDecision::NeedsConfirmation { orders } => {
            println!("Batch: {decision}");
            let args: Vec<String> = orders.iter().map(|o| format!("--confirm {o}")).collect();
            println!("  Commit with {} or --confirm-all.", args.join(" "));
        }
    }
}

fn print_warnings(trace: &TraceBundle, verbose: bool) {
    let shown: Vec<_> = trace
        .warnings
        .iter()
        .filter(|w| verbose || !matches!(w.visibility, TraceVisibility::OnDemand))
        .collect();
    if shown.is_empty() {
        return;
    }
    println!("\nNotes:");
    for w in shown {
        match w.sequence_number {
            Some(seq) => println!("  - #{seq}: {}", w.message),
            None => println!("  - {}", w.message),
        }
    }
}

fn print_trace(trace: &TraceBundle) {
    println!("\n--- Reasoning (trace v{}) ---", trace.trace_schema_version);
    for entry in &trace.entries {
        println!(
            "\n  [{}] #{} line {}: {}",
            entry.entry_id,
            entry.sequence_number,
            entry.line_index + 1,
            entry.raw_text
        );
        for step in &entry.steps {
            println!("    {}", step.message);
        }
    }
    for decision in &trace.decisions {
        println!(
            "\n  [{}] {}: {}",
            decision.decision_id, decision.outcome, decision.reason
        );
        for step in &decision.steps {
            println!("    {}", step.message);
        }
    }
}
