//! tests/backend_tests.rs
//! Pruebas de los backends de impresión y de los argumentos de wkhtmltopdf.

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::models::print_model::{Margins, PagePreset, PageSize, ResolvedPrintJob};
    use crate::services::pdf_service::wkhtmltopdf_args;
    use crate::services::printer_backend::{
        parse_lpstat_default, parse_lpstat_printers, parse_windows_printers,
        WindowsOrientation, WindowsPrintOptions,
    };

    fn job(orientation: Option<&str>) -> ResolvedPrintJob {
        ResolvedPrintJob {
            printer_name: "Zebra ZT410".to_string(),
            page_size: PageSize::Preset(PagePreset::A4),
            margins: Margins::DEFAULT,
            print_background: true,
            orientation: orientation.map(str::to_string),
        }
    }

    #[test]
    fn test_automatic_orientation_is_omitted() {
        let options = WindowsPrintOptions::from_job(&job(Some("Automatic")));
        let value = serde_json::to_value(&options).unwrap();

        assert!(value.get("orientation").is_none());
        assert_eq!(
            value,
            json!({
                "printer": "Zebra ZT410",
                "fitToPage": true,
                "silent": true,
                "scale": "noscale"
            })
        );
    }

    #[test]
    fn test_only_exact_orientation_names_are_sent() {
        assert_eq!(
            WindowsPrintOptions::from_job(&job(Some("Portrait"))).orientation,
            Some(WindowsOrientation::Portrait)
        );
        assert_eq!(
            WindowsPrintOptions::from_job(&job(Some("Landscape"))).orientation,
            Some(WindowsOrientation::Landscape)
        );
        assert_eq!(
            WindowsPrintOptions::from_job(&job(Some("landscape"))).orientation,
            None
        );
        assert_eq!(WindowsPrintOptions::from_job(&job(None)).orientation, None);

        let value = serde_json::to_value(WindowsPrintOptions::from_job(&job(Some("Landscape"))))
            .unwrap();
        assert_eq!(value["orientation"], json!("landscape"));
    }

    #[test]
    fn test_sumatra_arguments() {
        let args = WindowsPrintOptions::from_job(&job(Some("Portrait"))).to_args();
        assert_eq!(
            args,
            vec![
                "-print-to",
                "Zebra ZT410",
                "-silent",
                "-print-settings",
                "fit,noscale,portrait"
            ]
        );

        let args = WindowsPrintOptions::from_job(&job(Some("Automatic"))).to_args();
        assert_eq!(args.last().map(String::as_str), Some("fit,noscale"));
    }

    #[test]
    fn test_parse_lpstat_output() {
        let output = "printer Zebra_ZT410 is idle.  enabled since Tue 01 Oct 2024\n\
                      printer Office now printing Office-12.  enabled since Tue 01 Oct 2024\n\
                      printer Broken disabled since Mon 30 Sep 2024 -\n\
                      \treason unknown\n";
        let printers = parse_lpstat_printers(output, Some("Office"));

        let names: Vec<_> = printers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Zebra_ZT410", "Office", "Broken"]);
        assert_eq!(printers[0].status.as_deref(), Some("IDLE"));
        assert_eq!(printers[1].status.as_deref(), Some("PRINTING"));
        assert_eq!(printers[2].status.as_deref(), Some("STOPPED"));
        assert!(printers[1].is_default);
        assert!(!printers[0].is_default);
    }

    #[test]
    fn test_parse_lpstat_default() {
        assert_eq!(
            parse_lpstat_default("system default destination: Zebra_ZT410\n"),
            Some("Zebra_ZT410".to_string())
        );
        assert_eq!(parse_lpstat_default("no system default destination\n"), None);
    }

    #[test]
    fn test_parse_windows_printers() {
        let single = r#"{"Name":"Zebra ZT410","Default":true,"PrinterStatus":3}"#;
        let printers = parse_windows_printers(single).unwrap();
        assert_eq!(printers.len(), 1);
        assert_eq!(printers[0].name, "Zebra ZT410");
        assert!(printers[0].is_default);
        assert_eq!(printers[0].status.as_deref(), Some("IDLE"));

        let many = r#"[{"Name":"A","Default":false,"PrinterStatus":7},{"Name":"B","Default":true}]"#;
        let printers = parse_windows_printers(many).unwrap();
        assert_eq!(printers.len(), 2);
        assert_eq!(printers[0].status.as_deref(), Some("OFFLINE"));
        assert_eq!(printers[1].status, None);

        assert!(parse_windows_printers("  ").unwrap().is_empty());
        assert!(parse_windows_printers("not json").is_err());
    }

    #[test]
    fn test_wkhtmltopdf_args_for_defaults() {
        let args = wkhtmltopdf_args(&job(None));

        let page = args.iter().position(|a| a == "--page-size").unwrap();
        assert_eq!(args[page + 1], "A4");
        assert!(args.contains(&"--background".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--margin")));
        // El HTML del cliente no debe poder leer archivos del host
        assert!(!args.contains(&"--enable-local-file-access".to_string()));
    }

    #[test]
    fn test_wkhtmltopdf_args_for_custom_geometry() {
        let mut custom = job(None);
        custom.page_size = PageSize::Custom {
            width: 6.0,
            height: 4.0,
        };
        custom.margins = Margins::Custom {
            top: 0.25,
            right: 0.5,
            bottom: 0.5,
            left: 0.1,
        };
        let args = wkhtmltopdf_args(&custom);

        let value_of = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };
        assert_eq!(value_of("--page-width"), "6in");
        assert_eq!(value_of("--page-height"), "4in");
        assert_eq!(value_of("--margin-top"), "0.25in");
        assert_eq!(value_of("--margin-right"), "0.5in");
        assert_eq!(value_of("--margin-left"), "0.1in");
        assert!(!args.contains(&"--page-size".to_string()));
    }
}
