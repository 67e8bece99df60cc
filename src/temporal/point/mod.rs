pub mod tgeogpoint;
pub mod tgeompoint;
pub mod tnpoint;
pub mod tpoint;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instant_tgeompoint() {
        let string = "POINT(0 0)@2018-01-01 08:00:00+00";
        let result: tgeompoint::TGeomPoint = string.parse().unwrap();
        assert_eq!(
            format!("{result:?}"),
            format!("Instant({})", string.to_owned())
        );
    }

    #[test]
    fn instant_tgeogpoint() {
        let string = "POINT(0 0)@2018-01-01 08:00:00+00";
        let result: tgeogpoint::TGeogPoint = string.parse().unwrap();
        assert_eq!(
            format!("{result:?}"),
            format!("Instant({})", string.to_owned())
        );
    }

    #[test]
    fn sequence_tgeompoint() {
        let string = "[POINT(0 0)@2018-01-01 08:00:00+00]";
        let result: tgeompoint::TGeomPoint = string.parse().unwrap();
        assert_eq!(
            format!("{result:?}"),
            format!("Sequence({})", string.to_owned())
        );
    }

    #[test]
    fn sequence_set_tgeompoint() {
        let string = "{[POINT(0 0)@2018-01-01 08:00:00+00]}";
        let result: tgeompoint::TGeomPoint = string.parse().unwrap();
        assert_eq!(
            format!("{result:?}"),
            format!("SequenceSet({})", string.to_owned())
        );
    }

    #[test]
    fn srid_is_parsed_and_validated() {
        let p: tgeompoint::TGeomPoint =
            "[SRID=4326;POINT(0 0)@2018-01-01, SRID=4326;POINT(1 1)@2018-01-02]"
                .parse()
                .unwrap();
        assert_eq!(tpoint::TPointTrait::srid(&p), 4326);

        let mixed: Result<tgeompoint::TGeomPoint, _> =
            "[SRID=4326;POINT(0 0)@2018-01-01, SRID=3857;POINT(1 1)@2018-01-02]".parse();
        assert!(mixed.is_err());
    }
}
