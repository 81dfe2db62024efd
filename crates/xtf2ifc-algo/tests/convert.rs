use std::fs;
use std::path::Path;
use tempfile::tempdir;
use xtf2ifc_algo::{convert_survey, output_name};
use xtf2ifc_core::report::EntityGrade;
use xtf2ifc_core::{ConversionConfig, ConvertError};
use xtf2ifc_import_xtf::parse_survey;

const SIA: &str = "SIA405_ABWASSER_2015_LV95.SIA405_Abwasser";

fn document() -> String {
    document_with("47.5", "300")
}

fn document_with(invert: &str, clear_height: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TRANSFER xmlns="http://www.interlis.ch/INTERLIS2.3">
  <DATASECTION>
    <{SIA} BID="b1">
      <{SIA}.Abwasserknoten TID="K1">
        <Lage><COORD><C1>2600100.0</C1><C2>1200200.0</C2></COORD></Lage>
        <Sohlenkote>{invert}</Sohlenkote>
      </{SIA}.Abwasserknoten>
      <{SIA}.Normschacht TID="S1">
        <Bezeichnung>Schacht Ost</Bezeichnung>
        <Dimension1>1000</Dimension1>
        <Dimension2>2500</Dimension2>
        <AbwasserbauwerkRef REF="K1"/>
      </{SIA}.Normschacht>
      <{SIA}.Normschacht TID="S2">
        <Bezeichnung>verloren</Bezeichnung>
      </{SIA}.Normschacht>
      <{SIA}.Haltungspunkt TID="P1">
        <Lage><COORD><C1>2600100.0</C1><C2>1200200.0</C2></COORD></Lage>
        <Kote>48.0</Kote>
        <AbwasserNetzelementRef REF="K1"/>
      </{SIA}.Haltungspunkt>
      <{SIA}.Haltungspunkt TID="P2">
        <Lage><COORD><C1>2600130.0</C1><C2>1200240.0</C2></COORD></Lage>
        <Kote>46.5</Kote>
      </{SIA}.Haltungspunkt>
      <{SIA}.Haltung TID="H1">
        <Bezeichnung>Haltung 1-2</Bezeichnung>
        <Lichte_Hoehe>{clear_height}</Lichte_Hoehe>
        <vonHaltungspunktRef REF="P1"/>
        <nachHaltungspunktRef REF="P2"/>
        <Verlauf><POLYLINE>
          <COORD><C1>2600115.0</C1><C2>1200220.0</C2></COORD>
        </POLYLINE></Verlauf>
      </{SIA}.Haltung>
    </{SIA}>
  </DATASECTION>
</TRANSFER>"#
    )
}

#[test]
fn converts_survey_to_ifc() {
    let cfg = ConversionConfig {
        highlight_incomplete: true,
        ..ConversionConfig::default()
    };
    let survey = parse_survey(&document(), &cfg).expect("parse");
    let conversion = convert_survey(survey, &cfg, "network").expect("convert");

    let report = &conversion.report;
    assert_eq!("SIA405_ABWASSER_2015_LV95", report.dialect);
    assert_eq!(2, report.parsed.node_points);
    assert_eq!(1, report.parsed.standard_shafts);
    assert_eq!(1, report.shafts_authored);
    assert_eq!(1, report.runs_authored);
    assert_eq!(vec!["S2".to_string()], report.unprocessed_shafts);
    assert!(report.unprocessed_runs.is_empty());
    assert!(report
        .warnings
        .iter()
        .any(|w| w.code == "unresolved_reference"));

    let ifc = &conversion.content;
    assert!(ifc.starts_with("ISO-10303-21;"));
    assert!(ifc.contains("FILE_SCHEMA(('IFC4X3_ADD2'));"));
    assert_eq!(1, ifc.matches("IFCPIPESEGMENT(").count());
    assert_eq!(1, ifc.matches("IFCDISTRIBUTIONCHAMBERELEMENT(").count());
    assert!(ifc.contains("'Haltung 1-2'"));
    assert!(ifc.contains("'Schacht Ost'"));
    assert!(ifc.contains("'Pset_SurveyShaft'"));
    assert!(ifc.contains("IFCMAPCONVERSION("));
    assert!(ifc.contains("2600100.000000,1200200.000000,40.000000"));

    assert_eq!(vec![EntityGrade::new("S1", "green")], report.shaft_grades);
    assert_eq!(1, report.run_grades.len());
}

#[test]
fn zero_defaults_except_invert() {
    let cfg = ConversionConfig {
        default_invert_elevation: 100.0,
        default_shaft_diameter: 0.0,
        default_shaft_height: 0.0,
        default_wall_thickness: 0.0,
        default_bottom_thickness: 0.0,
        default_pipe_wall_thickness: 0.0,
        highlight_incomplete: true,
        ..ConversionConfig::default()
    };
    let survey = parse_survey(&document_with("100", "300"), &cfg).expect("parse");
    let conversion = convert_survey(survey, &cfg, "network").expect("convert");

    let report = &conversion.report;
    assert_eq!(1, report.shafts_authored);
    assert_eq!(1, report.runs_authored);
    // An invert equal to the default counts as missing.
    assert_eq!(vec![EntityGrade::new("S1", "orange")], report.shaft_grades);

    let ifc = &conversion.content;
    // Wall-less pipe: a solid disk without inner radius.
    assert!(ifc.contains(",0.150000,$,$,$);"));
    assert!(!ifc.contains("'CSG'"));
    assert_eq!(2, ifc.matches("'Body','SweptSolid',(").count());
}

#[test]
fn negative_clear_height_skips_only_that_run() {
    let cfg = ConversionConfig::default();
    let survey = parse_survey(&document_with("47.5", "-300"), &cfg).expect("parse");
    let conversion = convert_survey(survey, &cfg, "network").expect("convert");

    let report = &conversion.report;
    assert_eq!(0, report.runs_authored);
    assert_eq!(1, report.shafts_authored);
    assert_eq!(vec!["H1".to_string()], report.unprocessed_runs);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.code == "degenerate_geometry" && w.message.contains("H1")));
    assert_eq!(0, conversion.content.matches("IFCPIPESEGMENT(").count());
}

#[test]
fn saved_document_replaces_the_target() {
    let dir = tempdir().expect("temp dir");
    let target = dir.path().join("network.ifc");
    fs::write(&target, "stale").expect("write stale");

    let cfg = ConversionConfig::default();
    let survey = parse_survey(&document(), &cfg).expect("parse");
    let conversion = convert_survey(survey, &cfg, "network").expect("convert");
    conversion.save_to_file(&target).expect("save");

    assert_eq!(conversion.content, fs::read_to_string(&target).expect("read"));
    // No temporary file left next to it.
    assert_eq!(1, fs::read_dir(dir.path()).expect("list").count());

    let missing_dir = dir.path().join("absent").join("network.ifc");
    assert!(conversion.save_to_file(&missing_dir).is_err());
}

#[test]
fn empty_survey_has_no_origin() {
    let xml = r#"<TRANSFER><DATASECTION/></TRANSFER>"#;
    let cfg = ConversionConfig::default();
    let survey = parse_survey(xml, &cfg).expect("parse");
    let err = convert_survey(survey, &cfg, "empty").err().expect("no origin");
    assert!(matches!(err, ConvertError::DegenerateOrigin { .. }));
}

#[test]
fn invalid_config_is_rejected_before_work() {
    let cfg = ConversionConfig {
        default_wall_thickness: -1.0,
        ..ConversionConfig::default()
    };
    let survey = parse_survey(&document(), &ConversionConfig::default()).expect("parse");
    let err = convert_survey(survey, &cfg, "network").err().expect("invalid");
    assert!(matches!(err, ConvertError::InvalidConfig(_)));
}

#[test]
fn output_sits_next_to_input() {
    assert_eq!(
        Path::new("/data/net.ifc"),
        output_name(Path::new("/data/net.xtf"))
    );
}
