//! Static content feed for the phishing-identification exercise.
//!
//! Supplied as configuration; the engine never mutates these records.

use training_contract::{Email, EmailId, Slide, TaskId};

fn email(
    id: u32,
    subject: &str,
    from: &str,
    body: &str,
    is_phishing: bool,
    hint: &str,
    solution: &str,
) -> Email {
    Email {
        id: EmailId(id),
        subject: subject.to_string(),
        from: from.to_string(),
        body: body.to_string(),
        is_phishing,
        hint: hint.to_string(),
        solution: solution.to_string(),
    }
}

/// The canonical email dataset for task 1.
pub fn task1_emails() -> Vec<Email> {
    vec![
        email(
            1,
            "Account Security Update Required",
            "security@bank.com",
            "Dear valued customer,\n\nWe have detected unusual activity in your account. Please click the link below to verify your identity and secure your account.\n\n[Suspicious Link]\n\nIf you do not verify within 24 hours, your account will be suspended.\n\nSecurity Team",
            true,
            "Pay attention to how the email tries to make you act quickly.",
            "This is a phishing attempt using urgency and threats. The generic greeting and suspicious link are red flags.",
        ),
        email(
            2,
            "Your Monthly Account Statement",
            "statements@chase.com",
            "Dear John Smith,\n\nYour monthly account statement for ending July 2023 is now available in your online banking portal.\n\nTo view your statement, please log in to your account at chase.com and visit the Statements section.\n\nNote: This is an automated message. Please do not reply.\n\nThank you,\nChase Bank",
            false,
            "Check how the email asks you to access your information.",
            "This is a legitimate email. It directs you to log in through the official website rather than clicking a link, uses your actual name, and doesn't create urgency.",
        ),
        email(
            3,
            "HR: Urgent Salary Update",
            "hr@company-payroll.net",
            "Dear Employee,\n\nThere has been an error in your latest salary payment. Please provide your bank details immediately to receive the correction payment.\n\nClick here to update: [Suspicious Link]\n\nHR Department",
            true,
            "Think about the normal process for handling payroll issues in a company.",
            "This is a phishing email. HR would never request bank details via email, and the domain is suspicious.",
        ),
        email(
            4,
            "Your Order has Shipped",
            "auto-confirm@amazon.com",
            "Hello John Smith,\n\nYour order #112-3456789-0123456 has shipped!\n\nEstimated delivery: July 25, 2023\n\nOrder Details:\n- Wireless Mouse ($24.99)\n- USB Cable ($9.99)\n\nTrack your package at amazon.com/orders\n\nThanks for shopping with us!\nAmazon.com",
            false,
            "Look at the level of specific details provided in the email.",
            "This is a legitimate email from Amazon. It includes specific order details, your name, and directs to the main website for tracking.",
        ),
        email(
            5,
            "IT Support: Required Password Change",
            "support@techdesk.org",
            "Dear User,\n\nOur security scan has detected weak passwords in your accounts. You must update your password within 2 hours.\n\nClick to change password: [Suspicious Link]\n\nIT Support Desk",
            true,
            "Consider the timeframe given and how IT typically handles password changes.",
            "This is a phishing email using time pressure and security fears. IT support would use official company domains and not force immediate password changes via email links.",
        ),
    ]
}

fn slide(title: &str, lines: &[&str]) -> Slide {
    Slide {
        title: title.to_string(),
        lines: lines.iter().map(|line| line.to_string()).collect(),
    }
}

/// Introduction slide deck shown once per session before the first attempt.
pub fn intro_slides() -> Vec<Slide> {
    vec![
        slide(
            "What is Phishing?",
            &[
                "Phishing is a cybercrime where attackers impersonate legitimate",
                "institutions to steal sensitive information.",
                "",
                "\u{2022} 90% of data breaches involve phishing",
                "\u{2022} Over 3.4 billion fake emails are sent daily",
                "\u{2022} 30% of phishing emails get opened",
            ],
        ),
        slide(
            "Common Phishing Tactics",
            &[
                "Attackers use various techniques to deceive users:",
                "",
                "\u{2022} Creating urgency or threat",
                "\u{2022} Impersonating trusted entities",
                "\u{2022} Using similar-looking domains",
                "\u{2022} Requesting sensitive information",
                "\u{2022} Poor grammar and spelling",
            ],
        ),
        slide(
            "How to Protect Yourself",
            &[
                "Key steps to identify phishing attempts:",
                "",
                "\u{2022} Verify sender email addresses",
                "\u{2022} Check for suspicious attachments",
                "\u{2022} Look for poor grammar/spelling",
                "\u{2022} Never click suspicious links",
                "\u{2022} Be wary of urgent requests",
            ],
        ),
        slide(
            "How to Play",
            &[
                "1. Select an email from the list",
                "2. Read the content carefully",
                "3. Mark it as Legitimate or Phishing based on your analysis",
                "4. Use hints carefully - they affect your score",
            ],
        ),
    ]
}

/// Display title for a task folder, depending on its unlock state.
pub fn folder_title(task: &TaskId, unlocked: bool) -> String {
    match (task.as_str(), unlocked) {
        ("1", _) => "Task 1: Phishing Detection".to_string(),
        ("2", true) => "Task 2: Network Security".to_string(),
        (other, _) => format!("Task {other}: Locked"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task1_dataset_has_unique_ids_and_known_labels() {
        let emails = task1_emails();
        assert_eq!(emails.len(), 5);
        let labels: Vec<bool> = emails.iter().map(|e| e.is_phishing).collect();
        assert_eq!(labels, vec![true, false, true, false, true]);
        let mut ids: Vec<u32> = emails.iter().map(|e| e.id.0).collect();
        ids.dedup();
        assert_eq!(ids.len(), emails.len());
    }

    #[test]
    fn intro_deck_has_four_slides() {
        assert_eq!(intro_slides().len(), 4);
    }

    #[test]
    fn locked_folders_carry_locked_titles() {
        let task2 = TaskId::trusted("2");
        assert_eq!(folder_title(&task2, false), "Task 2: Locked");
        assert_eq!(folder_title(&task2, true), "Task 2: Network Security");
    }
}
