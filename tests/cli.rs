//! End-to-end CLI tests
//!
//! Drives the compiled binary against scratch period directories. Every
//! invocation points `FACTURERO_DATA_DIR` at a per-test scratch location
//! so the operator's real configuration is never touched.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const KEY: &str = "50614032401011234560000100001010000000011199999999";

const XML_TEMPLATE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FacturaElectronica xmlns="https://cdn.comprobanteselectronicos.go.cr/xml-schemas/v4.3/facturaElectronica">
  <Clave>{KEY}</Clave>
  <FechaEmision>2024-03-14T10:21:54-06:00</FechaEmision>
  <Emisor>
    <Nombre>{ISSUER}</Nombre>
    <Identificacion>
      <Tipo>02</Tipo>
      <Numero>3101123456</Numero>
    </Identificacion>
  </Emisor>
  <Receptor>
    <Nombre>CLIENTE FINAL</Nombre>
    <Identificacion>
      <Tipo>01</Tipo>
      <Numero>109870654</Numero>
    </Identificacion>
  </Receptor>
  <ResumenFactura>
    <TotalVentaNeta>10000.00000</TotalVentaNeta>
    <TotalImpuesto>1300.00000</TotalImpuesto>
    <TotalDesgloseImpuesto>
      <Codigo>01</Codigo>
      <CodigoTarifaIVA>08</CodigoTarifaIVA>
      <TotalMontoImpuesto>1300.00000</TotalMontoImpuesto>
    </TotalDesgloseImpuesto>
    <TotalComprobante>11300.00000</TotalComprobante>
  </ResumenFactura>
</FacturaElectronica>"#;

/// One scratch per test: a period root plus an isolated config dir
struct Workspace {
    temp: TempDir,
    root: PathBuf,
    config_dir: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("periodo");
        let config_dir = temp.path().join("config");
        fs::create_dir_all(root.join("XML")).unwrap();
        fs::create_dir_all(root.join("PDF")).unwrap();
        fs::create_dir_all(&config_dir).unwrap();
        Self {
            temp,
            root,
            config_dir,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("facturero").unwrap();
        cmd.env("FACTURERO_DATA_DIR", &self.config_dir);
        cmd
    }

    fn scratch(&self) -> &Path {
        self.temp.path()
    }

    fn write_document(&self, key: &str, issuer: &str) {
        let xml = XML_TEMPLATE
            .replace("{KEY}", key)
            .replace("{ISSUER}", issuer);
        fs::write(self.root.join("XML").join(format!("{key}.xml")), xml).unwrap();
    }

    fn write_evidence(&self, key: &str) {
        let body = format!("%PDF-1.4 comprobante {key}");
        fs::write(
            self.root.join("PDF").join(format!("Factura_{key}.pdf")),
            body,
        )
        .unwrap();
    }
}

/// Distinct valid keys that differ only in the security code
fn test_key(n: u32) -> String {
    format!("{}{:08}", &KEY[..42], n)
}

/// Run a command, assert success, return its stdout
fn run(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "stdout: {}\nstderr: {}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn dir_count(path: &Path) -> usize {
    fs::read_dir(path).unwrap().count()
}

#[test]
fn test_scan_lists_every_reconciliation_state() {
    let ws = Workspace::new();
    let paired = test_key(1);
    let waiting = test_key(2);
    let unmatched = test_key(3);
    ws.write_document(&paired, "FERRETERIA CENTRAL");
    ws.write_evidence(&paired);
    ws.write_document(&waiting, "LIBRERIA UNIVERSAL");
    ws.write_evidence(&unmatched);

    let stdout = run(ws.cmd().arg("scan").arg(&ws.root));

    assert!(stdout.contains("3 records: 1 pendiente, 1 pendiente_pdf, 1 sin_xml"));
    assert!(stdout.contains("FERRETERIA CENTRAL"));
    assert!(stdout.contains("LIBRERIA UNIVERSAL"));
    assert!(stdout.contains("Scan summary"));
    assert!(stdout.contains("Metadata documents: 2"));
    assert!(stdout.contains("Linked:             1"));
    assert!(stdout.contains("Synthesized:        1"));
}

#[test]
fn test_scan_reports_omitted_administrative_files() {
    let ws = Workspace::new();
    let key = test_key(4);
    ws.write_document(&key, "FERRETERIA CENTRAL");
    ws.write_evidence(&key);
    fs::write(
        ws.root.join("PDF").join("estado de cuenta marzo.pdf"),
        b"movimientos del mes, sin clave",
    )
    .unwrap();

    let stdout = run(ws.cmd().arg("scan").arg(&ws.root));

    assert!(stdout.contains("1 record: 1 pendiente"));
    assert!(stdout.contains("not an invoice"));
    assert!(stdout.contains("estado de cuenta marzo.pdf"));
    assert!(stdout.contains("1 file omitted"));
}

#[test]
fn test_scan_empty_period_prints_guidance() {
    let ws = Workspace::new();

    let stdout = run(ws.cmd().arg("scan").arg(&ws.root));

    assert!(stdout.contains("No records found in this period."));
    assert!(stdout.contains("Drop metadata documents under XML/ and evidence files under PDF/."));
}

#[test]
fn test_scan_report_flag_writes_audit_json() {
    let ws = Workspace::new();
    let key = test_key(5);
    ws.write_document(&key, "FERRETERIA CENTRAL");
    ws.write_evidence(&key);

    let stdout = run(ws.cmd().arg("scan").arg(&ws.root).arg("--report"));
    assert!(stdout.contains("Scan report written to: "));

    let reports_dir = ws.root.join(".metadata").join("reports");
    let reports: Vec<_> = fs::read_dir(&reports_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].starts_with("scan-"));
    assert!(reports[0].ends_with(".json"));

    let contents = fs::read_to_string(reports_dir.join(&reports[0])).unwrap();
    assert!(contents.contains("\"metadata_documents\": 1"));
    assert!(contents.contains("\"linked\": 1"));
}

#[test]
fn test_record_shows_full_details() {
    let ws = Workspace::new();
    let key = test_key(6);
    ws.write_document(&key, "FERRETERIA CENTRAL");
    ws.write_evidence(&key);

    let stdout = run(ws.cmd().arg("record").arg(&ws.root).arg(&key));

    assert!(stdout.contains(&format!("Record:      {key}")));
    assert!(stdout.contains("State:       pendiente"));
    assert!(stdout.contains("Issued:      14/03/2024"));
    assert!(stdout.contains("Type:        Factura Electrónica"));
    assert!(stdout.contains("Issuer:      FERRETERIA CENTRAL (3101123456)"));
    assert!(stdout.contains("Receiver:    CLIENTE FINAL (109870654)"));
    assert!(stdout.contains("Subtotal:    10000"));
    assert!(stdout.contains("IVA 13%:"));
    assert!(stdout.contains("Total:       11300"));
    assert!(stdout.contains(&format!("Factura_{key}.pdf")));
}

#[test]
fn test_record_rejects_malformed_key() {
    let ws = Workspace::new();

    ws.cmd()
        .arg("record")
        .arg(&ws.root)
        .arg("12345")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid document key '12345'"))
        .stderr(predicate::str::contains("expected 50 digits, got 5"));
}

#[test]
fn test_classify_moves_evidence_into_accounting_tree() {
    let ws = Workspace::new();
    let keys: Vec<String> = (1..=50).map(test_key).collect();
    for key in &keys {
        ws.write_document(key, "FERRETERIA CENTRAL");
        ws.write_evidence(key);
    }
    let drive = ws.scratch().join("drive");

    let mut cmd = ws.cmd();
    cmd.arg("classify").arg(&ws.root);
    for key in &keys {
        cmd.arg("--key").arg(key);
    }
    cmd.arg("--category")
        .arg("COMPRAS")
        .arg("--client")
        .arg("CLIENTE DEMO")
        .arg("--drive")
        .arg(&drive)
        .arg("--year")
        .arg("2024")
        .arg("--operator")
        .arg("MARIA");

    let stdout = run(&mut cmd);
    assert!(stdout.contains("Classification complete"));
    assert!(stdout.contains("  Moved:       50"));

    let dest = drive
        .join("PF-2024")
        .join("Contabilidades")
        .join("MARZO")
        .join("CLIENTE DEMO")
        .join("COMPRAS")
        .join("FERRETERIA CENTRAL");
    assert_eq!(dir_count(&dest), 50);
    assert!(dest.join(format!("Factura_{}.pdf", keys[0])).exists());
    // Sources are gone once their copies are verified
    assert_eq!(dir_count(&ws.root.join("PDF")), 0);

    // A raw re-scan sees metadata without evidence
    let rescanned = run(ws.cmd().arg("scan").arg(&ws.root));
    assert!(rescanned.contains("50 records: 50 pendiente_pdf"));
    assert!(!rescanned.contains("clasificado"));

    // The registry overlays the ledger on top of the same scan
    let registry = run(ws.cmd().arg("registry").arg(&ws.root));
    assert!(registry.contains("50 records: 50 clasificado"));

    let ledger = run(ws.cmd().arg("ledger").arg("list").arg(&ws.root));
    assert!(ledger.contains("50 classifications"));

    let audit = run(ws.cmd().arg("audit").arg(&ws.root));
    assert!(audit.contains("CREATE"));
    assert!(audit.contains("Classification"));
    assert!(audit.contains("Showing 20 of 50 entries"));
}

#[test]
fn test_classify_without_evidence_records_intent() {
    let ws = Workspace::new();
    let waiting = test_key(7);
    let unknown = test_key(8);
    ws.write_document(&waiting, "COOPELESCA R.L.");

    let output = ws
        .cmd()
        .arg("classify")
        .arg(&ws.root)
        .arg("--key")
        .arg(&waiting)
        .arg("--key")
        .arg(&unknown)
        .arg("--category")
        .arg("GASTOS")
        .arg("--subtype")
        .arg("GASTOS GENERALES")
        .arg("--account")
        .arg("ELECTRICIDAD")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stdout.contains("recorded as pendiente_pdf (no evidence file yet)"));
    assert!(stdout.contains("Record not found"));
    assert!(stdout.contains("  Moved:       0"));
    assert!(stdout.contains("  Intent only: 1"));
    assert!(stdout.contains("  Failed:      1"));
    assert!(stderr.contains("1 of 2 classifications failed"));

    // The intent survives as a pending ledger row
    let row = run(ws.cmd().arg("ledger").arg("show").arg(&ws.root).arg(&waiting));
    assert!(row.contains(&format!("Classification: {waiting}")));
    assert!(row.contains("pendiente_pdf"));
    assert!(row.contains("GASTOS"));
    assert!(row.contains("ELECTRICIDAD"));
}

#[test]
fn test_catalog_add_remove_and_duplicate() {
    let ws = Workspace::new();

    let added = run(ws
        .cmd()
        .arg("catalog")
        .arg("add")
        .arg(&ws.root)
        .arg("gastos")
        .arg("gastos generales")
        .arg("seguridad"));
    assert!(added.contains("Added account: GASTOS/GASTOS GENERALES/SEGURIDAD"));

    let listing = run(ws.cmd().arg("catalog").arg("list").arg(&ws.root));
    assert!(listing.contains("SEGURIDAD"));
    // Baseline accounts are always present
    assert!(listing.contains("ELECTRICIDAD"));

    ws.cmd()
        .arg("catalog")
        .arg("add")
        .arg(&ws.root)
        .arg("GASTOS")
        .arg("GASTOS GENERALES")
        .arg("SEGURIDAD")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Account already exists: GASTOS/GASTOS GENERALES/SEGURIDAD",
        ));

    let removed = run(ws
        .cmd()
        .arg("catalog")
        .arg("remove")
        .arg(&ws.root)
        .arg("GASTOS")
        .arg("GASTOS GENERALES")
        .arg("SEGURIDAD"));
    assert!(removed.contains("Removed account: GASTOS/GASTOS GENERALES/SEGURIDAD"));

    ws.cmd()
        .arg("catalog")
        .arg("remove")
        .arg(&ws.root)
        .arg("GASTOS")
        .arg("GASTOS GENERALES")
        .arg("SEGURIDAD")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Account not found"));
}

#[test]
fn test_catalog_import_from_legacy_listing() {
    let ws = Workspace::new();
    let listing = ws.scratch().join("cuentas.txt");
    fs::write(
        &listing,
        "codigo|nombre|padre\n\
         5-01-001|Materiales electricos|5-01\n\
         6-01-002|Vigilancia|6-01\n\
         4-01-001|Ventas locales|4-01\n\
         5-01-001|Materiales electricos|5-01\n",
    )
    .unwrap();

    let stdout = run(ws
        .cmd()
        .arg("catalog")
        .arg("import")
        .arg(&ws.root)
        .arg(&listing));

    assert!(stdout.contains("Import complete"));
    assert!(stdout.contains("  Added:           2"));
    assert!(stdout.contains("  Duplicates:      1"));
    assert!(stdout.contains("  Unknown parents: 1"));

    let tree = run(ws.cmd().arg("catalog").arg("list").arg(&ws.root));
    assert!(tree.contains("MATERIALES ELECTRICOS"));
    assert!(tree.contains("VIGILANCIA"));
}

#[test]
fn test_export_records_csv_to_file() {
    let ws = Workspace::new();
    let key = test_key(9);
    ws.write_document(&key, "FERRETERIA CENTRAL");
    ws.write_evidence(&key);
    let out = ws.scratch().join("registro.csv");

    let stdout = run(ws
        .cmd()
        .arg("export")
        .arg("records")
        .arg(&ws.root)
        .arg("--output")
        .arg(&out));
    assert!(stdout.contains("Exported 1 records to: "));

    let contents = fs::read_to_string(&out).unwrap();
    assert!(contents.starts_with("clave,fecha_emision"));
    assert!(contents.contains(&key));
    assert!(contents.contains("FERRETERIA CENTRAL"));
}

#[test]
fn test_export_ledger_yaml_to_stdout() {
    let ws = Workspace::new();
    let key = test_key(10);
    ws.write_document(&key, "COOPELESCA R.L.");
    run(ws
        .cmd()
        .arg("classify")
        .arg(&ws.root)
        .arg("--key")
        .arg(&key)
        .arg("--category")
        .arg("GASTOS"));

    let stdout = run(ws
        .cmd()
        .arg("export")
        .arg("ledger")
        .arg(&ws.root)
        .arg("--format")
        .arg("yaml"));

    assert!(stdout.starts_with("# Facturero ledger export"));
    assert!(stdout.contains(&key));
}

#[test]
fn test_config_show_and_set_roundtrip() {
    let ws = Workspace::new();

    let shown = run(ws.cmd().arg("config").arg("show"));
    assert!(shown.contains("Configuration file: "));
    assert!(shown.contains("Accounting drive:"));
    assert!(shown.contains("Fiscal year:"));
    assert!(shown.contains("Open fiscal years:"));

    let drive = run(ws
        .cmd()
        .arg("config")
        .arg("set")
        .arg("drive")
        .arg("/mnt/contabilidad"));
    assert!(drive.contains("Accounting drive set to: /mnt/contabilidad"));

    let year = run(ws.cmd().arg("config").arg("set").arg("year").arg("2024"));
    assert!(year.contains("Fiscal year set to: 2024"));

    let open = run(ws
        .cmd()
        .arg("config")
        .arg("set")
        .arg("open-years")
        .arg("2025,2023"));
    // The active year joins the list; the list comes back sorted
    assert!(open.contains("Open fiscal years set to: 2023, 2024, 2025"));

    let reloaded = run(ws.cmd().arg("config").arg("show"));
    assert!(reloaded.contains("Accounting drive:  /mnt/contabilidad"));
    assert!(reloaded.contains("Fiscal year:       2024"));
    assert!(reloaded.contains("2023, 2024, 2025"));

    ws.cmd()
        .arg("config")
        .arg("set")
        .arg("color")
        .arg("azul")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "valid keys are drive, year, open-years",
        ));
}

#[test]
fn test_audit_trail_lists_recent_operations() {
    let ws = Workspace::new();

    let empty = run(ws.cmd().arg("audit").arg(&ws.root));
    assert!(empty.contains("No audit entries recorded."));

    run(ws
        .cmd()
        .arg("catalog")
        .arg("add")
        .arg(&ws.root)
        .arg("GASTOS")
        .arg("GASTOS GENERALES")
        .arg("AGUA"));

    let trail = run(ws.cmd().arg("audit").arg(&ws.root));
    assert!(trail.contains("CREATE"));
    assert!(trail.contains("CatalogAccount"));
    assert!(trail.contains("GASTOS/GASTOS GENERALES/AGUA"));
    assert!(trail.contains("Showing 1 of 1 entries"));
}
