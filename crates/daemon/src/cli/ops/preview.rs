use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

use common::draw::{assign, AssignError};

/// Draw a sample cycle for a list of names, without storing or sending anything
#[derive(Args, Debug, Clone)]
pub struct Preview {
    /// Participant name; repeat for each participant
    #[arg(long = "name", required = true)]
    pub names: Vec<String>,

    /// Seed the shuffle for a reproducible preview
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Preview {
    fn draw(&self) -> Result<Vec<(String, String)>, AssignError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Ok(assign(self.names.clone(), &mut rng)?
            .into_iter()
            .map(|a| (a.giver, a.giftee_name))
            .collect())
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Preview {
    type Error = AssignError;
    type Output = String;

    async fn execute(&self, _ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let lines: Vec<String> = self
            .draw()?
            .into_iter()
            .map(|(giver, giftee)| format!("{} -> {}", giver, giftee))
            .collect();
        Ok(lines.join("\n"))
    }
}
