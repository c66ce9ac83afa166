use crate::file::HumdrumFile;
use crate::types::line::Line;
use crate::types::token::TokenId;

fn push_unique(target: &mut Vec<TokenId>, ids: &[TokenId]) {
    for id in ids {
        if !target.contains(id) {
            target.push(*id);
        }
    }
}

fn resolve(lines: &[Line], neighbours: &[TokenId], forward: bool) -> Vec<TokenId> {
    let mut resolved = Vec::new();
    for id in neighbours {
        let Some(token) = lines.get(id.line).and_then(|line| line.token(id.field)) else {
            continue;
        };
        if token.is_non_null_data() {
            push_unique(&mut resolved, &[*id]);
        } else if forward {
            push_unique(&mut resolved, token.next_non_null_data_tokens());
        } else {
            push_unique(&mut resolved, token.previous_non_null_data_tokens());
        }
    }
    resolved
}

pub(crate) fn analyze_links(file: &mut HumdrumFile) {
    for index in 0..file.lines.len() {
        for field in 0..file.lines[index].token_count() {
            let token = &file.lines[index].tokens()[field];
            let previous = resolve(&file.lines, token.previous_tokens(), false);
            file.lines[index].tokens_mut()[field].set_previous_non_null(previous);
        }
    }

    for index in (0..file.lines.len()).rev() {
        for field in 0..file.lines[index].token_count() {
            let token = &file.lines[index].tokens()[field];
            let next = resolve(&file.lines, token.next_tokens(), true);
            file.lines[index].tokens_mut()[field].set_next_non_null(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_humdrum;
    use crate::types::token::TokenId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_tokens_resolve_to_previous_event() {
        let file = parse_humdrum("**kern\t**kern\n2c\t4e\n.\t4f\n.\t.\n4d\t4g\n*-\t*-").unwrap();

        let null = file[2].token(0).unwrap();
        assert_eq!(null.null_resolution(), Some(TokenId::new(1, 0)));
        assert_eq!(null.next_non_null_data_tokens(), &[TokenId::new(4, 0)]);

        let event = file[4].token(1).unwrap();
        assert_eq!(event.previous_non_null_data_tokens(), &[TokenId::new(2, 1)]);
        assert_eq!(event.null_resolution(), None);

        let start = file[0].token(0).unwrap();
        assert!(start.previous_non_null_data_tokens().is_empty());
        assert_eq!(start.next_non_null_data_tokens(), &[TokenId::new(1, 0)]);
        assert!(file[5].token(0).unwrap().next_non_null_data_tokens().is_empty());
    }

    #[test]
    fn test_links_branch_across_split_and_merge() {
        let input = "**kern\n2c\n*^\n4d\t4e\n.\t.\n*v\t*v\n.\n4f\n*-";
        let file = parse_humdrum(input).unwrap();

        assert_eq!(
            file[1].token(0).unwrap().next_non_null_data_tokens(),
            &[TokenId::new(3, 0), TokenId::new(3, 1)]
        );
        let after_merge = file[6].token(0).unwrap();
        assert_eq!(
            after_merge.previous_non_null_data_tokens(),
            &[TokenId::new(3, 0), TokenId::new(3, 1)]
        );
        assert_eq!(after_merge.null_resolution(), Some(TokenId::new(3, 0)));
        assert_eq!(
            file[4].token(1).unwrap().next_non_null_data_tokens(),
            &[TokenId::new(7, 0)]
        );
    }
}
