//! Built-in example matters used when the store holds nothing usable.

use crate::types::{
    Case, CaseDocument, CaseNote, CaseStatus, FinancialCategory, FinancialRecord, FinancialType,
    Person,
};

pub const SAMPLE_CONTRACT: &str = r#"MUTUAL NON-DISCLOSURE AGREEMENT

This Mutual Non-Disclosure Agreement (the "Agreement") is entered into by and between TechCorp Inc. and DataFlow Ltd. (collectively, the "Parties") as of October 25, 2023.

1. Confidential Information.
"Confidential Information" means all non-public information disclosed by a Party to the other Party, whether orally or in writing, that is designated as confidential or that reasonably should be understood to be confidential given the nature of the information and the circumstances of disclosure.

2. Obligations.
Each Party agrees to hold the other Party's Confidential Information in strict confidence and not to disclose such information to any third party without the prior written consent of the disclosing Party. The receiving Party shall use the Confidential Information solely for the purpose of evaluating a potential business relationship.

3. Term and Termination.
This Agreement shall remain in effect for a period of five (5) years from the Effective Date. The obligations of confidentiality shall survive the termination of this Agreement for a period of two (2) years.

4. Governing Law.
This Agreement shall be governed by and construed in accordance with the laws of the State of New York.

5. Limitation of Liability.
IN NO EVENT SHALL EITHER PARTY BE LIABLE FOR ANY INDIRECT, INCIDENTAL, SPECIAL, OR CONSEQUENTIAL DAMAGES ARISING OUT OF OR IN CONNECTION WITH THIS AGREEMENT.
"#;

fn fin(
    id: &str,
    date: &str,
    description: &str,
    amount: f64,
    kind: FinancialType,
    category: FinancialCategory,
) -> FinancialRecord {
    FinancialRecord {
        id: id.into(),
        date: date.into(),
        description: description.into(),
        amount,
        kind,
        category,
    }
}

/// Three matters, one per status.
pub fn seed_cases() -> Vec<Case> {
    vec![
        Case {
            id: "CS-2024-001".into(),
            title: "Merger: OmniCorp & FutureSystems".into(),
            client: "OmniCorp Global Holdings".into(),
            status: CaseStatus::Active,
            description: "Review of acquisition terms, IP transfer agreements, and regulatory \
                compliance for EU markets."
                .into(),
            access_code: "1234".into(),
            progress: 65,
            last_updated: "2 hours ago".into(),
            documents: vec![
                CaseDocument {
                    id: "d1".into(),
                    title: "Primary Merger Agreement_v3.pdf".into(),
                    doc_type: "Contract".into(),
                    content: SAMPLE_CONTRACT.into(),
                    date_added: "2024-02-10".into(),
                },
                CaseDocument {
                    id: "d2".into(),
                    title: "IP Portfolio Audit.docx".into(),
                    doc_type: "Audit".into(),
                    content: "Audit text content placeholder...".into(),
                    date_added: "2024-02-12".into(),
                },
            ],
            people: vec![
                Person {
                    id: "p1".into(),
                    name: "Eleanor Sterling".into(),
                    role: "Lead Counsel".into(),
                    organization: "Veritas Legal".into(),
                    email: "e.sterling@veritas.law".into(),
                },
                Person {
                    id: "p2".into(),
                    name: "Marcus Chen".into(),
                    role: "Client Representative".into(),
                    organization: "OmniCorp".into(),
                    email: "m.chen@omnicorp.com".into(),
                },
            ],
            notes: vec![CaseNote {
                id: "n1".into(),
                content: "Clause 4.2 needs revision regarding GDPR compliance.".into(),
                date: "2024-02-14".into(),
                author: "Eleanor Sterling".into(),
            }],
            financials: vec![
                fin("f1", "2024-02-10", "Initial Retainer", 5000.0, FinancialType::Income, FinancialCategory::FlatFee),
                fin("f2", "2024-02-12", "Document Review (3h)", 1500.0, FinancialType::Income, FinancialCategory::BillableHours),
                fin("f3", "2024-02-13", "Filing Fees", 250.0, FinancialType::Expense, FinancialCategory::CourtFee),
            ],
        },
        Case {
            id: "CS-2024-042".into(),
            title: "Estate of A. Vanderbilt".into(),
            client: "Vanderbilt Trust".into(),
            status: CaseStatus::Pending,
            description: "Probate verification and asset distribution analysis.".into(),
            access_code: "1234".into(),
            progress: 15,
            last_updated: "1 day ago".into(),
            documents: vec![],
            people: vec![],
            notes: vec![],
            financials: vec![],
        },
        Case {
            id: "CS-2023-899".into(),
            title: "Litigation: TechFlow v. DataStream".into(),
            client: "TechFlow Inc.".into(),
            status: CaseStatus::Archived,
            description: "Intellectual property dispute resolution.".into(),
            access_code: "1234".into(),
            progress: 100,
            last_updated: "Oct 2023".into(),
            documents: vec![],
            people: vec![],
            notes: vec![],
            financials: vec![fin(
                "f99",
                "2023-10-01",
                "Settlement Analysis",
                12000.0,
                FinancialType::Income,
                FinancialCategory::BillableHours,
            )],
        },
    ]
}
